//! Postgres value codecs and large objects
//!
//! # Examples
//!
//! Typed values:
//!
//! ```
//! use pgtype::types::{AssignTo, Int4, PgValue, Set, TextArray};
//!
//! let mut int = Int4::default();
//! int.set(420i32).unwrap();
//!
//! let mut buf = bytes::BytesMut::new();
//! int.encode_text(&mut buf).unwrap();
//! assert_eq!(&buf[..], b"420");
//!
//! let small: i16 = int.assign().unwrap();
//! assert_eq!(small, 420);
//!
//! let array = TextArray::decode_text(Some(b"{foo,NULL,\"bar baz\"}")).unwrap();
//! let strings: Vec<Option<String>> = array.assign().unwrap();
//! assert_eq!(strings, [Some("foo".into()), None, Some("bar baz".into())]);
//! ```
//!
//! Large object, over any [`PgTransport`][transport::PgTransport]:
//!
//! ```no_run
//! use pgtype::large_object::Mode;
//!
//! # async fn app(conn: &mut impl pgtype::transport::PgTransport) -> pgtype::Result<()> {
//! let mut tx = pgtype::begin(conn).await?;
//! let mut objects = tx.large_objects();
//!
//! let oid = objects.create(0).await?;
//! let mut lo = objects.open(oid, Mode::WRITE).await?;
//! lo.write(b"hello").await?;
//! lo.close().await?;
//!
//! tx.commit().await?;
//! # Ok(())
//! # }
//! ```

mod common;
mod ext;

// Protocol
pub mod postgres;
pub mod transport;

// Value
mod status;
pub mod types;
pub mod registry;

// Operation
pub mod fastpath;
pub mod transaction;
pub mod large_object;

mod error;

#[cfg(test)]
mod testing;

pub use status::Status;
pub use registry::{Codec, Registry, Value};
pub use transaction::{Transaction, begin};
pub use large_object::{LargeObject, LargeObjects};
pub use error::{Error, ErrorKind, Result};
