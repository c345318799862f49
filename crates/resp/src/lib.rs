//! # RESP - Redis Serialization Protocol Library
//!
//! A zero-copy RESP codec for Rust, supporting both RESP2 and RESP3.
//!
//! The crate has three entry points, one per job:
//!
//! - [`Validator`] measures how many bytes of a buffer form one complete,
//!   well-formed message, without building any values. Stream readers use it
//!   to delimit messages.
//! - [`Decoder`] turns bytes into a [`RespValue`] plus the undecoded
//!   remainder.
//! - [`Encoder`] (or the [`RespEncoder`] trait) turns values back into bytes.
//!
//! Untrusted input is bounded by [`Limits`] on nesting depth, aggregate
//! counts and bulk lengths.
//!
//! ## Example
//!
//! ```rust
//! use bytes::BytesMut;
//! use resp::Decoder;
//! use resp::Encoder;
//! use resp::RespValue;
//! use resp::push_order;
//!
//! let decoder = Decoder::new(push_order::arrival);
//! let mut stream = BytesMut::from(&b"*2\r\n$3\r\nGET\r\n$1\r\na\r\n+partial"[..]);
//!
//! let request = decoder.decode_frame(&mut stream).unwrap().unwrap();
//! assert_eq!(
//!     request,
//!     RespValue::array(vec![RespValue::bulk_string("GET"), RespValue::bulk_string("a")])
//! );
//! assert_eq!(&stream[..], b"+partial");
//!
//! let mut encoder = Encoder::new();
//! encoder.encode(&RespValue::Null).unwrap();
//! assert_eq!(&encoder.build()[..], b"_\r\n");
//! ```

mod encode;
mod error;
mod limits;
mod parser;
mod types;
mod utils;
mod validate;

pub use encode::EncodeError;
pub use encode::EncodePolicy;
pub use encode::Encoder;
pub use encode::RespEncoder;
pub use error::ParseError;
pub use error::RespError;
pub use error::ValidationError;
pub use error::ValidationErrorKind;
pub use limits::Limits;
pub use parser::Decoder;
pub use parser::RespParseResult;
pub use parser::parse;
pub use types::PushOrder;
pub use types::PushQueue;
pub use types::RespValue;
pub use types::push_order;
pub use validate::Validator;
pub use validate::frame_len;
pub use validate::validate;
