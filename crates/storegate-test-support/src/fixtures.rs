//! Credential and payload samples shared by proxy and client tests.

use std::net::TcpListener;

use anyhow::Result;
use serde_json::json;

/// Three-segment token shaped like a JWT.
pub const SAMPLE_JWT: &str = "abc.def.ghi";

/// Multipart boundary used by [`multipart_import_body`].
pub const MULTIPART_BOUNDARY: &str = "storegate-test-boundary";

/// A long base64-alphabet value that the proxy classifies as encrypted.
#[must_use]
pub fn opaque_token(len: usize) -> String {
    "QUJDRGVmZ2hpams0NTY3ODkw+/"
        .chars()
        .cycle()
        .take(len)
        .collect()
}

/// GraphQL envelope for `document`, serialised as JSON.
#[must_use]
pub fn graphql_body(document: &str) -> String {
    json!({ "query": document, "variables": {} }).to_string()
}

/// GraphQL envelope carrying an explicit `operationName`.
#[must_use]
pub fn graphql_body_named(document: &str, operation_name: &str) -> String {
    json!({
        "query": document,
        "variables": {},
        "operationName": operation_name,
    })
    .to_string()
}

/// Login mutation whose credential must never reach the upstream.
#[must_use]
pub fn login_mutation() -> String {
    graphql_body(
        "mutation GenerateCustomerToken($email: String!, $password: String!) \
         { generateCustomerToken(email: $email, password: $password) { token } }",
    )
}

/// Multipart body shaped like a dashboard bulk import upload.
///
/// Contains a CSV part, a binary images part with bytes that are not valid
/// UTF-8, and the warehouse id field.
#[must_use]
pub fn multipart_import_body() -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{MULTIPART_BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"products.csv\"\r\n\
             Content-Type: text/csv\r\n\r\n\
             sku,name\r\nSKU-1,Widget\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!(
            "--{MULTIPART_BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"images\"; filename=\"images.zip\"\r\n\
             Content-Type: application/zip\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(&[0x50, 0x4b, 0x03, 0x04, 0xff, 0xfe, 0x00, 0x80]);
    body.extend_from_slice(
        format!(
            "\r\n--{MULTIPART_BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"warehouse_id\"\r\n\r\n\
             7\r\n--{MULTIPART_BOUNDARY}--\r\n"
        )
        .as_bytes(),
    );
    body
}

/// `Content-Type` header value matching [`multipart_import_body`].
#[must_use]
pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}")
}

/// URL of a loopback port with nothing listening on it.
///
/// # Errors
///
/// Returns an error if no ephemeral port can be reserved.
pub fn unreachable_url(path: &str) -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}{path}"))
}
