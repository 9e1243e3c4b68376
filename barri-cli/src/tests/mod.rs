//! Shared test harness modules for the barri CLI.

use super::*;

mod compare_unit;
mod helpers;
