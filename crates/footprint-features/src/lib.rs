//! Lifestyle profiles and their encoding into model input rows.
//!
//! This crate turns the typed answers of a carbon footprint questionnaire into the exact
//! column layout a pre-trained regressor expects:
//!
//! 1. **Profile** ([`profile`]) - The typed input record with closed categorical levels and
//!    bounded numeric answers
//! 2. **Schema** ([`schema`]) - The ordered column list the model was trained on
//! 3. **Encoding** ([`encoder`]) - Profile → [`FeatureVector`](vector::FeatureVector) aligned
//!    to the schema
//! 4. **Scaling** ([`scaler`]) - The pre-fit transform of the six numeric columns
//!
//! # Architecture
//!
//! ```text
//! LifestyleProfile
//!     ↓ FeatureEncoder::encode (one-hot, multi-label, raw numerics)
//! FeatureVector (schema order)
//!     ↓ FeatureScaler::transform
//! model input row
//! ```
//!
//! The categorical encoding tables live next to the enums they describe
//! ([`attribute`]), so the baseline of every one-hot group is declared in exactly one
//! place.
//!
//! # Example
//!
//! ```rust,no_run
//! use footprint_features::{
//!     encoder::FeatureEncoder, profile::LifestyleProfile, scaler::FeatureScaler,
//!     schema::SchemaRegistry,
//! };
//!
//! let schema = SchemaRegistry::open("models/carbon/columns.json")?;
//! let scaler = FeatureScaler::open("models/carbon/scaler.json")?;
//! let encoder = FeatureEncoder::new(&schema)?;
//!
//! let mut row = encoder.encode(&LifestyleProfile::default())?;
//! scaler.transform(&mut row)?;
//! println!("{}", serde_json::to_string_pretty(&row)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod attribute;
pub mod encoder;
pub mod profile;
pub mod scaler;
pub mod schema;
pub mod vector;
