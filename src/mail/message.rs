//! MIME composition for the report email.
//!
//! The message is a single `multipart/related` body: one HTML part that
//! references each image through a `cid:embedded_image_<i>` URI, followed by
//! one inline image part per file with the matching `Content-ID`. The whole
//! message serializes with CRLF line endings and is base64-url encoded into
//! the raw form the mail API accepts.
//!
//! Unlike the chart exporter, this stage is strict about its inputs: every
//! image path must be readable, and a missing file fails the composition.

use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use sha2::{Digest, Sha256};

use crate::error::{PixReportError, Result};

const CRLF: &str = "\r\n";
const BASE64_LINE_WIDTH: usize = 76;

/// Composed email, ready for submission.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    raw: String,
    mime: String,
    content_ids: Vec<String>,
    part_count: usize,
}

impl EmailMessage {
    /// Base64-url encoded form accepted by the send endpoint.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The serialized RFC 2822 message before transport encoding.
    #[must_use]
    pub fn mime(&self) -> &str {
        &self.mime
    }

    #[must_use]
    pub fn content_ids(&self) -> &[String] {
        &self.content_ids
    }

    /// 1 (HTML) + one per embedded image.
    #[must_use]
    pub fn part_count(&self) -> usize {
        self.part_count
    }
}

/// Build the report message with every image embedded inline.
///
/// # Errors
/// Returns `ImageRead` if any image path cannot be read. No partial message
/// is produced.
pub fn compose_with_images(
    sender: &str,
    recipients: &[String],
    subject: &str,
    body_text: &str,
    image_paths: &[PathBuf],
) -> Result<EmailMessage> {
    let mut images = Vec::with_capacity(image_paths.len());
    for path in image_paths {
        let bytes = fs::read(path).map_err(|source| PixReportError::ImageRead {
            path: path.clone(),
            source,
        })?;
        images.push((path.as_path(), bytes));
    }

    let boundary = derive_boundary(sender, subject, image_paths);
    let content_ids: Vec<String> = (0..images.len())
        .map(|i| format!("embedded_image_{i}"))
        .collect();

    let mut mime = String::new();
    push_line(&mut mime, &format!("To: {}", recipients.join(", ")));
    push_line(&mut mime, &format!("From: {sender}"));
    push_line(&mut mime, &format!("Subject: {subject}"));
    push_line(&mut mime, "MIME-Version: 1.0");
    push_line(
        &mut mime,
        &format!("Content-Type: multipart/related; boundary=\"{boundary}\""),
    );
    push_line(&mut mime, "");

    // HTML part.
    push_line(&mut mime, &format!("--{boundary}"));
    push_line(&mut mime, "Content-Type: text/html; charset=\"utf-8\"");
    push_line(&mut mime, "Content-Transfer-Encoding: 7bit");
    push_line(&mut mime, "");
    push_line(&mut mime, &html_body(body_text, &content_ids));

    // One inline image part per file.
    for ((path, bytes), content_id) in images.iter().zip(&content_ids) {
        push_line(&mut mime, &format!("--{boundary}"));
        push_line(&mut mime, &format!("Content-Type: {}", mime_type(path)));
        push_line(&mut mime, "Content-Transfer-Encoding: base64");
        push_line(&mut mime, &format!("Content-ID: <{content_id}>"));
        push_line(
            &mut mime,
            &format!(
                "Content-Disposition: inline; filename=\"{}\"",
                file_name(path)
            ),
        );
        push_line(&mut mime, "");
        push_line(&mut mime, &wrap_base64(&STANDARD.encode(bytes)));
    }

    push_line(&mut mime, &format!("--{boundary}--"));

    let raw = URL_SAFE.encode(mime.as_bytes());
    Ok(EmailMessage {
        raw,
        mime,
        part_count: 1 + content_ids.len(),
        content_ids,
    })
}

fn html_body(body_text: &str, content_ids: &[String]) -> String {
    let images: String = content_ids
        .iter()
        .enumerate()
        .map(|(i, cid)| {
            format!(
                "        <img src=\"cid:{cid}\" alt=\"Chart {n}\" style=\"max-width: 600px;\"><br>{CRLF}",
                n = i + 1
            )
        })
        .collect();

    format!(
        "<html>{CRLF}    <body>{CRLF}        <p>{body_text}</p>{CRLF}{images}    </body>{CRLF}</html>"
    )
}

/// Boundary derived from the message inputs. Base64-encoded part bodies
/// cannot contain the `=_` prefix, so a collision would require the HTML
/// text itself to embed the full hash.
fn derive_boundary(sender: &str, subject: &str, image_paths: &[PathBuf]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(sender.as_bytes());
    hasher.update(subject.as_bytes());
    for path in image_paths {
        hasher.update(path.to_string_lossy().as_bytes());
    }
    let digest = format!("{:x}", hasher.finalize());
    format!("=_{}", &digest[..24])
}

fn mime_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        // The exporter only writes PNG; anything else is a caller extension.
        _ => "image/png",
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.to_string_lossy().into_owned(), |n| {
            n.to_string_lossy().into_owned()
        })
}

fn wrap_base64(encoded: &str) -> String {
    encoded
        .as_bytes()
        .chunks(BASE64_LINE_WIDTH)
        .map(String::from_utf8_lossy)
        .collect::<Vec<_>>()
        .join(CRLF)
}

fn push_line(buffer: &mut String, line: &str) {
    buffer.push_str(line);
    buffer.push_str(CRLF);
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
