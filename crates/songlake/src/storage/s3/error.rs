//! S3 error mapping.
//!
//! Maps AWS SDK errors to `StorageError` from `songlake_core::storage`.

use std::error::Error;
use std::fmt::Debug;

use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::operation::delete_objects::DeleteObjectsError;
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::operation::list_objects_v2::ListObjectsV2Error;
use aws_sdk_s3::operation::put_object::PutObjectError;
use songlake_core::storage::StorageError;

/// Map a GetObject SDK error to StorageError.
pub fn map_get_object_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<GetObjectError, R>,
    key: &str,
) -> StorageError {
    match err {
        SdkError::ServiceError(ref service) if service.err().is_no_such_key() => {
            StorageError::NotFound {
                location: key.to_string(),
            }
        }
        err => map_sdk_error("GetObject", key, err),
    }
}

/// Map a ListObjectsV2 SDK error to StorageError.
pub fn map_list_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<ListObjectsV2Error, R>,
    prefix: &str,
) -> StorageError {
    match err {
        SdkError::ServiceError(ref service) if service.err().is_no_such_bucket() => {
            StorageError::NotFound {
                location: prefix.to_string(),
            }
        }
        err => map_sdk_error("ListObjectsV2", prefix, err),
    }
}

/// Map a PutObject SDK error to StorageError.
pub fn map_put_object_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<PutObjectError, R>,
    key: &str,
) -> StorageError {
    map_sdk_error("PutObject", key, err)
}

/// Map a DeleteObjects SDK error to StorageError.
pub fn map_delete_objects_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<DeleteObjectsError, R>,
    prefix: &str,
) -> StorageError {
    map_sdk_error("DeleteObjects", prefix, err)
}

/// Transport failures become `ConnectionFailed`; everything else is `Io`.
fn map_sdk_error<E, R>(operation: &str, target: &str, err: SdkError<E, R>) -> StorageError
where
    E: Error + Send + Sync + 'static,
    R: Debug + Send + Sync + 'static,
{
    let message = format!("{operation} {target} failed: {}", DisplayErrorContext(&err));
    match err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => {
            StorageError::ConnectionFailed(message)
        }
        _ => StorageError::Io(message),
    }
}

/// Map a request build error to StorageError.
pub fn map_build_error(err: impl std::fmt::Display) -> StorageError {
    StorageError::InvalidData(format!("Invalid S3 request: {err}"))
}
