//! Captured-page-shaped HTML fixtures for offline extraction tests.

/// A well-formed snapshot page for MC 515038 with the full labeled table,
/// all three marker tables, and the content-date announcement.
pub const SNAPSHOT_PAGE: &str = r#"<html>
<body>
<p><b>The information below reflects the content of the FMCSA management information systems as of 01/15/2024.</b></p>
<center>
<table>
  <tr><th>Entity Type:</th><td>CARRIER</td></tr>
  <tr><th>Operating Authority Status:</th><td>AUTHORIZED FOR Property *Please Note: current as of today</td></tr>
  <tr><th>Out of Service Date:</th><td>None</td></tr>
  <tr><th>Legal Name:</th><td>ACME TRUCKING LLC</td></tr>
  <tr><th>DBA Name:</th><td>ACME EXPRESS</td></tr>
  <tr><th>Physical Address:</th><td>100 Main St, Chicago, IL 60601</td></tr>
  <tr><th>Phone:</th><td>(555) 123-4567</td></tr>
  <tr><th>Mailing Address:</th><td>PO Box 7, Chicago, IL 60601</td></tr>
  <tr><th>USDOT Number:</th><td>1515151</td></tr>
  <tr><th>State Carrier ID Number:</th><td></td></tr>
  <tr><th>MC/MX/FF Number(s):</th><td>MC-515038</td></tr>
  <tr><th>DUNS Number:</th><td>--</td></tr>
  <tr><th>Power Units:</th><td>12</td></tr>
  <tr><th>Drivers:</th><td>14</td></tr>
  <tr><th>MCS-150 Form Date:</th><td>01/01/2023</td></tr>
  <tr><th>MCS-150 Mileage (Year):</th><td>250,000 (2022)</td></tr>
</table>
<table summary="Operation Classification">
  <tr><td>X</td><td>Auth. For Hire</td><td></td><td>Exempt For Hire</td></tr>
</table>
<table summary="Carrier Operation">
  <tr><td>X</td><td>Interstate</td><td></td><td>Intrastate Only (HM)</td></tr>
</table>
<table summary="Cargo Carried">
  <tr><td>X</td><td>General Freight</td><td>X</td><td>Metal: sheets, coils, rolls</td></tr>
</table>
</center>
</body>
</html>"#;

/// A snapshot page without the expected content anchor - the lookup service's
/// "no record matched" screen.
pub const NOT_FOUND_PAGE: &str = r#"<html>
<body>
<p>Query Result: no records found for your search criteria.</p>
</body>
</html>"#;

/// A registration page carrying an XOR-obfuscated email near the Email label.
/// The payload decodes to "safety@acmetrucking.example" with key 0x5a.
pub fn registration_page_obfuscated() -> String {
    let key = 0x5au8;
    let encoded: String = std::iter::once(format!("{:02x}", key))
        .chain(
            "safety@acmetrucking.example"
                .bytes()
                .map(|b| format!("{:02x}", b ^ key)),
        )
        .collect();
    format!(
        r##"<html>
<body>
<div>
  <label>Email: </label><a href="#" data-cfemail="{}">[email protected]</a>
</div>
</body>
</html>"##,
        encoded
    )
}

/// A registration page where the email is plain text next to the label.
pub const REGISTRATION_PAGE_PLAIN: &str = r#"<html>
<body>
<div>
  <label>Email: </label><span>dispatch@acmetrucking.example</span>
</div>
</body>
</html>"#;
