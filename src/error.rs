use thiserror::Error;

#[derive(Error, Debug)]
pub enum PickerError {
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Image not found: {0}")]
    NotFound(String),

    #[error("Invalid display dimensions: {width}x{height}")]
    InvalidDimensions { width: f64, height: f64 },

    #[error("Coordinates ({x}, {y}) out of bounds for {width}x{height} display")]
    OutOfBounds { x: f64, y: f64, width: f64, height: f64 },

    #[error("Invariant violated: {0}")]
    Invariant(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl PickerError {
    /// Stable code used by callers to tell the error kinds apart.
    pub fn kind(&self) -> &'static str {
        match self {
            PickerError::Decode(_) => "decode",
            PickerError::NotFound(_) => "not_found",
            PickerError::InvalidDimensions { .. } => "invalid_dimensions",
            PickerError::OutOfBounds { .. } => "out_of_bounds",
            PickerError::Invariant(_) => "invariant",
            PickerError::Io(_) => "io",
            PickerError::Json(_) => "json",
            PickerError::InvalidParameter(_) => "invalid_parameter",
        }
    }
}

impl From<image::ImageError> for PickerError {
    fn from(e: image::ImageError) -> Self {
        PickerError::Decode(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PickerError>;

// Serialized as { "kind": ..., "error": ... } for transport error responses
impl serde::Serialize for PickerError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("PickerError", 2)?;
        state.serialize_field("kind", self.kind())?;
        state.serialize_field("error", &self.to_string())?;
        state.end()
    }
}
