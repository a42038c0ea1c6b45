//! Testing utilities and mock implementations.
//!
//! Applications embedding the converter behind the [`Converter`] trait can
//! use these doubles to test without a gpsbabel installation.
//!
//! [`Converter`]: crate::converter::Converter

mod mock_converter;

pub use mock_converter::{MockConverter, RecordedConversion};
