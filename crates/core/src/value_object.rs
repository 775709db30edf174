//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. Every result the
/// forecasting engine hands back (forecasts, seasonality analyses, safety-stock
/// recommendations) is a value object: the caller owns it once returned and the
/// engine keeps no reference to it.
///
/// The trait requires:
/// - **Clone**: results are copied freely between layers (API, persistence, sinks)
/// - **PartialEq**: two results with identical fields are the same result
/// - **Debug**: results should be debuggable (logging, testing)
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq)]
/// struct Prediction {
///     date: NaiveDate,
///     predicted_demand: f64,
/// }
///
/// impl ValueObject for Prediction {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
