//! Tagged errors
//!
//! [`Error<D>`] pairs a stable [`ErrorCode`] with a typed payload. Functions return
//! [`Expected<T, D>`] where the payload type is known, and [`AnyExpected<T>`] where errors of
//! several payload types meet. `?` converts the former into the latter, and
//! [`AnyError::downcast_ref`] recovers the original payload.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use core::any::Any;
use core::fmt;

use crate::core::DispatchKey;

/// Stable numeric error identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum ErrorCode {
    /// A binding for the same dispatch key already exists
    DuplicateBinding = 1,
    SinkFull = 2,
    InvalidValue = 3,
    NodeFault = 4,
    Timeout = 5,
    NotReady = 6,
}

impl ErrorCode {
    pub const fn name(self) -> &'static str {
        match self {
            ErrorCode::DuplicateBinding => "DuplicateBinding",
            ErrorCode::SinkFull => "SinkFull",
            ErrorCode::InvalidValue => "InvalidValue",
            ErrorCode::NodeFault => "NodeFault",
            ErrorCode::Timeout => "Timeout",
            ErrorCode::NotReady => "NotReady",
        }
    }

    pub const fn code(self) -> u16 {
        self as u16
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error payload
///
/// Implementors decide how the payload reads in [`Error::message`].
pub trait ErrorData: fmt::Debug + Send + Sync + 'static {
    /// `false` for payload-free errors, which render without the payload suffix
    const HAS_DATA: bool = true;

    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl ErrorData for () {
    const HAS_DATA: bool = false;

    fn describe(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Ok(())
    }
}

impl ErrorData for &'static str {
    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self)
    }
}

impl ErrorData for String {
    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self)
    }
}

impl ErrorData for DispatchKey {
    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

/// An error code with a typed payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error<D: ErrorData = ()> {
    code: ErrorCode,
    data: D,
}

impl Error<()> {
    pub const fn new(code: ErrorCode) -> Self {
        Self { code, data: () }
    }
}

impl<D: ErrorData> Error<D> {
    pub const fn with_data(code: ErrorCode, data: D) -> Self {
        Self { code, data }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn data(&self) -> &D {
        &self.data
    }

    pub fn into_data(self) -> D {
        self.data
    }

    /// Renders `Error <name>:<code>`, followed by `. <payload>` when there is one
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl<D: ErrorData> fmt::Display for Error<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error {}:{}", self.code.name(), self.code.code())?;
        if D::HAS_DATA {
            f.write_str(". ")?;
            self.data.describe(f)?;
        }
        Ok(())
    }
}

impl<D: ErrorData> core::error::Error for Error<D> {}

impl From<ErrorCode> for Error<()> {
    fn from(code: ErrorCode) -> Self {
        Self::new(code)
    }
}

trait DynError: fmt::Display + fmt::Debug + Send + Sync {
    fn code(&self) -> ErrorCode;
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<D: ErrorData> DynError for Error<D> {
    fn code(&self) -> ErrorCode {
        self.code
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Type-erased [`Error`]
pub struct AnyError(Box<dyn DynError>);

impl AnyError {
    pub fn code(&self) -> ErrorCode {
        self.0.code()
    }

    pub fn message(&self) -> String {
        self.0.to_string()
    }

    pub fn is<D: ErrorData>(&self) -> bool {
        self.0.as_any().is::<Error<D>>()
    }

    /// Borrows the original error if its payload type is `D`
    pub fn downcast_ref<D: ErrorData>(&self) -> Option<&Error<D>> {
        self.0.as_any().downcast_ref()
    }

    /// Recovers the original error if its payload type is `D`, or returns `self` unchanged
    pub fn downcast<D: ErrorData>(self) -> Result<Error<D>, Self> {
        if self.is::<D>() {
            match self.0.into_any().downcast::<Error<D>>() {
                Ok(error) => Ok(*error),
                Err(_) => unreachable!(),
            }
        } else {
            Err(self)
        }
    }
}

impl<D: ErrorData> From<Error<D>> for AnyError {
    fn from(error: Error<D>) -> Self {
        Self(Box::new(error))
    }
}

impl From<ErrorCode> for AnyError {
    fn from(code: ErrorCode) -> Self {
        Error::new(code).into()
    }
}

impl fmt::Display for AnyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for AnyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AnyError").field(&self.0).finish()
    }
}

impl core::error::Error for AnyError {}

pub type Expected<T, D = ()> = Result<T, Error<D>>;

pub type AnyExpected<T> = Result<T, AnyError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ComponentId, MessageId, SystemId};

    #[derive(Debug, Clone, PartialEq)]
    struct Altitude {
        meters: i32,
    }

    impl ErrorData for Altitude {
        fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "altitude={}", self.meters)
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Probability(f32);

    impl ErrorData for Probability {
        fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "probability of impact={}", self.0)
        }
    }

    fn below_floor() -> Expected<i32, Altitude> {
        Err(Error::with_data(
            ErrorCode::InvalidValue,
            Altitude { meters: -12 },
        ))
    }

    fn impact_risk() -> Expected<f32, Probability> {
        Err(Error::with_data(ErrorCode::NodeFault, Probability(0.5)))
    }

    fn not_ready() -> Expected<u8> {
        Err(Error::new(ErrorCode::NotReady))
    }

    fn aggregate(selector: i32) -> AnyExpected<i32> {
        match selector {
            1 => Ok(below_floor()?),
            2 => Ok(impact_risk()? as i32),
            3 => Ok(not_ready()?.into()),
            _ => Ok(selector),
        }
    }

    fn nested(selector: i32) -> AnyExpected<i32> {
        let value = aggregate(selector)?;
        Ok(value * 2)
    }

    #[test]
    fn error_with_data() {
        let error = Error::with_data(ErrorCode::InvalidValue, Altitude { meters: 123 });
        assert_eq!(error.code(), ErrorCode::InvalidValue);
        assert_eq!(error.code().name(), "InvalidValue");
        assert_eq!(error.data().meters, 123);
        assert_eq!(error.message(), "Error InvalidValue:3. altitude=123");
    }

    #[test]
    fn error_without_data() {
        let error = Error::new(ErrorCode::DuplicateBinding);
        assert_eq!(error.message(), "Error DuplicateBinding:1");
        assert_eq!(Error::from(ErrorCode::Timeout).message(), "Error Timeout:5");
    }

    #[test]
    fn string_error() {
        let error = Error::with_data(ErrorCode::SinkFull, "Hello world");
        assert_eq!(error.message(), "Error SinkFull:2. Hello world");

        let error = Error::with_data(ErrorCode::SinkFull, String::from("Hello world"));
        assert_eq!(error.message(), "Error SinkFull:2. Hello world");
    }

    #[test]
    fn dispatch_key_error() {
        let key = DispatchKey::new(
            MessageId::from_truncating(9001),
            SystemId::new(1),
            ComponentId::new(2),
        );
        let error = Error::with_data(ErrorCode::DuplicateBinding, key);
        assert_eq!(
            error.message(),
            "Error DuplicateBinding:1. msg 9001 from 1/2"
        );
    }

    #[test]
    fn value_passes_through() {
        assert_eq!(nested(100).unwrap(), 200);
    }

    #[test]
    fn nested_propagation_keeps_code_and_payload() {
        let error = nested(1).unwrap_err();
        assert_eq!(error.code(), ErrorCode::InvalidValue);
        assert_eq!(error.message(), "Error InvalidValue:3. altitude=-12");
        assert!(error.is::<Altitude>());
        assert_eq!(
            error.downcast_ref::<Altitude>().map(|error| error.data()),
            Some(&Altitude { meters: -12 })
        );
        assert!(error.downcast_ref::<Probability>().is_none());

        let error = nested(2).unwrap_err();
        assert_eq!(error.code(), ErrorCode::NodeFault);
        assert_eq!(error.message(), "Error NodeFault:4. probability of impact=0.5");

        let error = nested(3).unwrap_err();
        assert_eq!(error.code(), ErrorCode::NotReady);
        assert!(error.downcast_ref::<()>().is_some());
    }

    #[test]
    fn owned_downcast() {
        let error = nested(1).unwrap_err();
        let error = error.downcast::<Probability>().unwrap_err();
        let error = error.downcast::<Altitude>().unwrap();
        assert_eq!(error.into_data(), Altitude { meters: -12 });
    }
}
