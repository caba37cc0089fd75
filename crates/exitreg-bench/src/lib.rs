//! Benchmark-only crate for exitreg. See `benches/`.
