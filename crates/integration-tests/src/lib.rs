//! End-to-end tests for the briefing server live under `tests/`.
