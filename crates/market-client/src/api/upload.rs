//! Multipart file uploads.
//!
//! The backend stores the file and answers with its public URL, which the
//! caller then puts into a profile, gig, post or delivery.

use crate::{ClientError, HttpClient};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::Deserialize;
use std::fmt;

/// Upload endpoint, which also decides the multipart field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
	Avatar,
	GigImage,
	PostImage,
	Delivery,
}

impl UploadKind {
	pub fn path(&self) -> &'static str {
		match self {
			UploadKind::Avatar => "/upload/avatar",
			UploadKind::GigImage => "/upload/gig-image",
			UploadKind::PostImage => "/upload/post-image",
			UploadKind::Delivery => "/upload/delivery",
		}
	}

	fn field(&self) -> &'static str {
		match self {
			UploadKind::Avatar => "avatar",
			UploadKind::GigImage | UploadKind::PostImage => "image",
			UploadKind::Delivery => "file",
		}
	}

	fn accepts(&self, mime: &str) -> bool {
		match self {
			UploadKind::Delivery => true,
			_ => mime.starts_with("image/"),
		}
	}
}

impl fmt::Display for UploadKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.path().trim_start_matches("/upload/"))
	}
}

/// Where the backend stored an upload.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct UploadedFile {
	pub url: String,
	#[serde(default)]
	pub path: Option<String>,
}

fn mime_for(file_name: &str) -> &'static str {
	let extension = file_name
		.rsplit_once('.')
		.map(|(_, ext)| ext.to_ascii_lowercase())
		.unwrap_or_default();
	match extension.as_str() {
		"png" => "image/png",
		"jpg" | "jpeg" => "image/jpeg",
		"gif" => "image/gif",
		"webp" => "image/webp",
		"pdf" => "application/pdf",
		"zip" => "application/zip",
		"txt" => "text/plain",
		_ => "application/octet-stream",
	}
}

#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait UploadApi: Send + Sync {
	async fn upload(
		&self,
		kind: UploadKind,
		file_name: String,
		contents: Vec<u8>,
	) -> Result<UploadedFile, ClientError>;
}

#[async_trait]
impl UploadApi for HttpClient {
	async fn upload(
		&self,
		kind: UploadKind,
		file_name: String,
		contents: Vec<u8>,
	) -> Result<UploadedFile, ClientError> {
		if contents.is_empty() {
			return Err(ClientError::Validation("The file is empty.".to_string()));
		}
		let mime = mime_for(&file_name);
		if !kind.accepts(mime) {
			return Err(ClientError::Validation(format!(
				"Only image files can be uploaded as {}.",
				kind
			)));
		}

		let part = Part::bytes(contents)
			.file_name(file_name)
			.mime_str(mime)
			.map_err(|e| ClientError::Validation(e.to_string()))?;
		let form = Form::new().part(kind.field(), part);

		let envelope = self
			.send::<UploadedFile, _>(Method::POST, kind.path(), |r| r.multipart(form))
			.await?;
		envelope
			.data
			.ok_or_else(|| ClientError::Decode("upload response has no url".to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_support::client_for;
	use serde_json::json;
	use wiremock::matchers::{header_regex, method, path};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	#[test]
	fn test_mime_detection() {
		assert_eq!(mime_for("me.PNG"), "image/png");
		assert_eq!(mime_for("brief.pdf"), "application/pdf");
		assert_eq!(mime_for("noext"), "application/octet-stream");
	}

	#[tokio::test]
	async fn test_upload_avatar() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/api/upload/avatar"))
			.and(header_regex("content-type", "^multipart/form-data"))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({
				"success": true,
				"data": { "url": "https://cdn.example.com/avatars/1.png" }
			})))
			.expect(1)
			.mount(&server)
			.await;

		let client = client_for(&server, Some("tok")).await;
		let uploaded = client
			.upload(UploadKind::Avatar, "me.png".into(), vec![0x89, 0x50])
			.await
			.unwrap();
		assert_eq!(uploaded.url, "https://cdn.example.com/avatars/1.png");
	}

	#[tokio::test]
	async fn test_non_image_rejected_locally() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.respond_with(ResponseTemplate::new(200))
			.expect(0)
			.mount(&server)
			.await;

		let client = client_for(&server, Some("tok")).await;
		let err = client
			.upload(UploadKind::PostImage, "notes.pdf".into(), vec![1])
			.await
			.unwrap_err();
		assert!(matches!(err, ClientError::Validation(_)));
		assert!(client
			.upload(UploadKind::Delivery, "empty.zip".into(), Vec::new())
			.await
			.is_err());
	}
}
