use indicatif::{ProgressBar, ProgressStyle};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;

#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub enum VerbosityLevel {
    Silent = 0,   // Only show progress bar and final summary
    Summary = 1,  // High-level scrape progress (default)
    Detailed = 2, // Per-MC results, warnings
    Debug = 3,    // All messages including debug info
}

impl VerbosityLevel {
    pub fn from_verbose_count(count: u8) -> Self {
        match count {
            0 => VerbosityLevel::Summary,
            1 => VerbosityLevel::Detailed,
            2.. => VerbosityLevel::Debug,
        }
    }
}

#[derive(Clone)]
pub struct ScrapeLogger {
    verbosity: VerbosityLevel,
    progress_bar: Arc<RwLock<Option<ProgressBar>>>,
    run_metadata: Arc<Mutex<RunMetadata>>,
    log_buffer: Arc<Mutex<Vec<String>>>,
    log_file_path: Option<String>,
}

#[derive(Default, Clone)]
struct RunMetadata {
    start_time: Option<SystemTime>,
    end_time: Option<SystemTime>,
    mc_numbers_attempted: usize,
    records_extracted: usize,
    records_filtered: usize,
    failures: usize,
    emails_found: usize,
    policies_found: usize,
    output_file: String,
}

impl ScrapeLogger {
    pub fn new(verbosity: VerbosityLevel) -> Self {
        Self {
            verbosity,
            progress_bar: Arc::new(RwLock::new(None)),
            run_metadata: Arc::new(Mutex::new(RunMetadata::default())),
            log_buffer: Arc::new(Mutex::new(Vec::new())),
            log_file_path: None,
        }
    }

    pub fn with_log_file(verbosity: VerbosityLevel, log_file_path: String) -> Self {
        Self {
            verbosity,
            progress_bar: Arc::new(RwLock::new(None)),
            run_metadata: Arc::new(Mutex::new(RunMetadata::default())),
            log_buffer: Arc::new(Mutex::new(Vec::new())),
            log_file_path: Some(log_file_path),
        }
    }

    // Core logging functions with consistent timestamp formatting
    pub fn info(&self, message: &str) {
        if self.verbosity >= VerbosityLevel::Summary {
            self.print_message("INFO", message);
        }
    }

    pub fn warn(&self, message: &str) {
        if self.verbosity >= VerbosityLevel::Detailed {
            self.print_message("WARN", message);
        }
    }

    pub fn error(&self, message: &str) {
        // Errors are always shown regardless of verbosity
        self.print_message("ERROR", message);
    }

    pub fn debug(&self, message: &str) {
        if self.verbosity >= VerbosityLevel::Debug {
            self.print_message("DEBUG", message);
        }
    }

    fn print_message(&self, level: &str, message: &str) {
        let timestamp = self.get_timestamp();
        let msg = format!("[{}] {}: {}", timestamp, level, message);

        // Store in log buffer if log file export is enabled
        if self.log_file_path.is_some() {
            if let Ok(mut buffer) = self.log_buffer.lock() {
                buffer.push(msg.clone());
            }
        }

        // Route through the progress bar when one is active to avoid
        // interfering with its fixed positioning
        if let Ok(guard) = self.progress_bar.try_read() {
            if let Some(pb) = guard.as_ref() {
                pb.println(msg);
                return;
            }
        }

        eprintln!("{}", msg);
    }

    fn get_timestamp(&self) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        let secs = now.as_secs();
        let millis = now.subsec_millis();

        let hours = (secs / 3600) % 24;
        let minutes = (secs % 3600) / 60;
        let seconds = secs % 60;

        format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
    }

    // Progress bar management
    pub async fn start_progress(&self, total_steps: u64) {
        let pb = ProgressBar::new(total_steps);

        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap_or_else(|_| {
                    ProgressStyle::default_bar()
                        .template("{bar:40} {pos}/{len} {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_bar())
                })
                .progress_chars("##-"),
        );

        pb.set_message("Initializing...");

        let mut progress_guard = self.progress_bar.write().await;
        *progress_guard = Some(pb);

        if let Ok(mut metadata) = self.run_metadata.lock() {
            metadata.start_time = Some(SystemTime::now());
        }
    }

    pub async fn update_progress(&self, message: &str) {
        if let Some(pb) = self.progress_bar.read().await.as_ref() {
            pb.set_message(message.to_string());
        }
    }

    pub async fn advance_progress(&self, steps: u64) {
        if let Some(pb) = self.progress_bar.read().await.as_ref() {
            pb.inc(steps);
        }
    }

    pub async fn finish_progress(&self, final_message: &str) {
        let mut progress_guard = self.progress_bar.write().await;
        if let Some(pb) = progress_guard.take() {
            pb.finish_and_clear();
        }
        drop(progress_guard);

        if let Ok(mut metadata) = self.run_metadata.lock() {
            metadata.end_time = Some(SystemTime::now());
        }

        if self.verbosity >= VerbosityLevel::Summary {
            self.print_message("INFO", final_message);
        }
    }

    // Specialized logging for scrape phases
    pub fn log_scrape_success(&self, mc_number: &str, legal_name: &str) {
        if let Ok(mut metadata) = self.run_metadata.lock() {
            metadata.mc_numbers_attempted += 1;
            metadata.records_extracted += 1;
        }
        self.info(&format!("MC {}: extracted {}", mc_number, legal_name));
    }

    pub fn log_scrape_filtered(&self, mc_number: &str) {
        if let Ok(mut metadata) = self.run_metadata.lock() {
            metadata.mc_numbers_attempted += 1;
            metadata.records_filtered += 1;
        }
        self.debug(&format!("MC {}: filtered out", mc_number));
    }

    pub fn log_scrape_failed(&self, mc_number: &str, error: &str) {
        if let Ok(mut metadata) = self.run_metadata.lock() {
            metadata.mc_numbers_attempted += 1;
            metadata.failures += 1;
        }
        self.warn(&format!("MC {}: extraction failed: {}", mc_number, error));
    }

    pub fn record_email_found(&self) {
        if let Ok(mut metadata) = self.run_metadata.lock() {
            metadata.emails_found += 1;
        }
    }

    pub fn record_policies_found(&self, count: usize) {
        if let Ok(mut metadata) = self.run_metadata.lock() {
            metadata.policies_found += count;
        }
    }

    pub fn log_export_success(&self, path: &str) {
        if let Ok(mut metadata) = self.run_metadata.lock() {
            metadata.output_file = path.to_string();
        }
        self.info(&format!("Export completed: {}", path));
    }

    pub fn log_enrichment_start(&self, record_count: usize) {
        self.info(&format!("Starting insurance enrichment for {} records", record_count));
    }

    pub fn log_enrichment_complete(&self, policy_count: usize) {
        self.record_policies_found(policy_count);
        self.info(&format!("Enrichment completed: {} policies discovered", policy_count));
    }

    // Final summary message
    pub fn print_final_summary(&self) {
        let metadata = match self.run_metadata.lock() {
            Ok(metadata) => metadata.clone(),
            Err(_) => return,
        };

        // Clear any remaining progress bar artifacts
        print!("\x1b[2K\r");
        let _ = io::stdout().flush();

        println!("\n=== SCRAPE SUMMARY ===");

        if let (Some(start), Some(end)) = (metadata.start_time, metadata.end_time) {
            let duration = end.duration_since(start).unwrap_or_default();
            println!("Run Duration: {:.2}s", duration.as_secs_f64());
        }

        println!("MC Numbers Attempted: {}", metadata.mc_numbers_attempted);
        println!("Records Extracted: {}", metadata.records_extracted);
        println!("Records Filtered: {}", metadata.records_filtered);
        println!("Failures: {}", metadata.failures);

        if metadata.policies_found > 0 {
            println!("Insurance Policies Found: {}", metadata.policies_found);
        }

        if !metadata.output_file.is_empty() {
            println!("Results Exported: {}", metadata.output_file);
        }

        println!("======================\n");
    }

    /// Export all collected logs to the specified file
    pub fn export_logs(&self) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(ref log_file_path) = self.log_file_path {
            if let Ok(buffer) = self.log_buffer.lock() {
                if let Some(parent) = Path::new(log_file_path).parent() {
                    std::fs::create_dir_all(parent)?;
                }

                let mut file = OpenOptions::new()
                    .create(true)
                    .write(true)
                    .truncate(true)
                    .open(log_file_path)?;

                for log_entry in buffer.iter() {
                    writeln!(file, "{}", log_entry)?;
                }

                file.flush()?;
                return Ok(());
            }
        }
        Ok(())
    }

    /// Check if log export is enabled
    pub fn is_log_export_enabled(&self) -> bool {
        self.log_file_path.is_some()
    }

    /// Get the current number of logged messages
    pub fn get_log_count(&self) -> usize {
        if let Ok(buffer) = self.log_buffer.lock() {
            buffer.len()
        } else {
            0
        }
    }
}
