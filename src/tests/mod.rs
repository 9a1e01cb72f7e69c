mod apply_tests;
mod error_tests;
