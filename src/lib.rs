//! Document Recognition Server
//!
//! Accepts document uploads, extracts text from images through an OCR
//! engine, labels each document by keyword and records it in SQLite.
//! Stored documents can be searched by text and summarized by type.
//!
//! # Modules
//!
//! - `ingest`: upload pipeline (store, extract, classify, record)
//! - `ocr`: OCR providers (Tesseract, Ollama)
//! - `storage`: blob storage (local filesystem, S3)
//! - `db`: document records
//! - `routes`: HTTP endpoints

pub mod config;
pub mod db;
pub mod error;
pub mod ingest;
pub mod ocr;
pub mod routes;
pub mod state;
pub mod storage;

pub use routes::app;
