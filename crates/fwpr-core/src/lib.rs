//! fwpr Core Types and Definitions
//!
//! This crate provides the foundational types shared by the fwpr procedure
//! code generator. It includes:
//!
//! - **Geometry**: Points and rectangles of the graphical model ([`geometry`] module)
//! - **Descriptor**: The validated procedure graph ([`descriptor`] module)
//! - **Text**: Normalisation and convention checks for free text ([`text`] module)

pub mod descriptor;
pub mod geometry;
pub mod text;
