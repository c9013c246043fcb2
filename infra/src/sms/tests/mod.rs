//! Tests for SMS providers
