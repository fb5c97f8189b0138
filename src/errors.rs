#[derive(Debug, strum::EnumIter)]
pub enum ErrorKind {
    InvalidInput(String),
    InvalidConfig(String),
    Conversion(ConversionError),
    Serialization(String),
    InternalError(String),
}

/// Failures of the numeric converter. Callers usually log them and substitute zero.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum ConversionError {
    #[default]
    #[display(fmt = "provided value is too big")]
    ValueTooBig,
    #[display(fmt = "cannot convert string to big value")]
    CastStringToBigInt,
    #[display(fmt = "negative denomination value")]
    NegativeDenomination,
}

impl std::error::Error for ConversionError {}

/// Error returned by constructors and by the few operations that are allowed to fail a whole call.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Error {
    /// Numeric category, stable across releases.
    pub code: u32,

    pub message: String,

    /// An error is retriable if the same block may succeed if submitted again.
    pub retriable: bool,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let retriable = if self.retriable { " (retriable)" } else { "" };
        write!(f, "Error #{}{}: {}", self.code, retriable, self.message)
    }
}

impl std::error::Error for Error {}

impl Error {
    pub fn from_error_kind(err: ErrorKind) -> Self {
        match err {
            ErrorKind::InvalidInput(message) => Self {
                code: 400,
                message: format!("Invalid Input: {}", message),
                retriable: false,
            },
            ErrorKind::InvalidConfig(message) => Self {
                code: 412,
                message: format!("Invalid Config: {}", message),
                retriable: false,
            },
            ErrorKind::Conversion(error) => Self {
                code: 422,
                message: format!("Conversion Error: {}", error),
                retriable: false,
            },
            ErrorKind::Serialization(message) => Self {
                code: 500,
                message: format!("Serialization Error: {}", message),
                retriable: true,
            },
            ErrorKind::InternalError(message) => Self {
                code: 500,
                message: format!("Internal Error: {}", message),
                retriable: true,
            },
        }
    }
}

impl<T> From<T> for Error
where
    T: Into<ErrorKind>,
{
    fn from(err: T) -> Self {
        Self::from_error_kind(err.into())
    }
}

impl From<ConversionError> for ErrorKind {
    fn from(error: ConversionError) -> Self {
        Self::Conversion(error)
    }
}

impl From<serde_json::Error> for ErrorKind {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(format!("Serialization failure: {:#?}", error))
    }
}

impl From<hex::FromHexError> for ErrorKind {
    fn from(error: hex::FromHexError) -> Self {
        Self::InvalidInput(format!("Could not decode hex: {}", error))
    }
}

impl From<bech32::Error> for ErrorKind {
    fn from(error: bech32::Error) -> Self {
        Self::InvalidInput(format!("Could not decode bech32 address: {}", error))
    }
}

impl From<std::io::Error> for ErrorKind {
    fn from(error: std::io::Error) -> Self {
        Self::InternalError(format!("IO failure: {}", error))
    }
}
