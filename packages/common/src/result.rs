use crate::error::CommonError;

/// Result alias for the shared loading helpers
pub type CommonResult<T> = Result<T, CommonError>;
