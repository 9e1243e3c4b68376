//! Tourism scoring and ranking for Barcelona neighbourhoods.
//!
//! The crate turns loosely-shaped [`NeighborhoodRecord`]s into a ranked top-N
//! list:
//! - the **normalizer** reads the first usable statistic (direct percentage,
//!   nested percentage, then the average of a monthly visitor series rescaled
//!   by a [`ReferenceMax`]);
//! - the **fallback** derives a deterministic placeholder from identifier
//!   digits when no statistic is usable;
//! - the [`TourismRanker`] sorts by descending score (stable) and truncates;
//! - **emergency substitution** fills an otherwise empty ranking with
//!   synthetic scores, perturbed by an injectable [`JitterSource`].
//!
//! The [`compare_neighbourhoods`] helper joins tourism and summary batches
//! for side-by-side display.
//!
//! # Examples
//!
//! ```
//! use barri_core::decode_batch;
//! use barri_scorer::{RankerConfig, TourismRanker};
//!
//! let batch = decode_batch(
//!     r#"[
//!         {"codi_barri": "01", "turisme_percentatge_districte": 40},
//!         {"codi_barri": "02", "turisme_percentatge_districte": 90},
//!         {"codi_barri": "03"}
//!     ]"#,
//! )?;
//! let ranker = TourismRanker::new(RankerConfig::default().with_top_n(2)?);
//! assert_eq!(ranker.rank(&batch).scores(), [90.0, 40.0]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! [`NeighborhoodRecord`]: barri_core::NeighborhoodRecord

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod compare;
mod emergency;
mod error;
mod fallback;
mod normalizer;
mod ranker;

pub use compare::{
    ComparisonRow, ComparisonSelection, DENSITY_REFERENCE, Indexed, IntensityBand,
    compare_neighbourhoods,
};
pub use emergency::{
    EMERGENCY_MAX, EMERGENCY_MIN, EMERGENCY_STEP, FixedJitter, JITTER_SPAN, JitterSource,
    SeededJitter, emergency_score,
};
pub use error::RankerConfigError;
pub use fallback::{FALLBACK_MAX, FALLBACK_MIN, fallback_score};
pub use normalizer::{DEFAULT_REFERENCE_MAX, NormalizedScore, ReferenceMax, normalize};
pub use ranker::{DEFAULT_TOP_N, RankerConfig, TourismRanker};
