//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! tagged enums with explicit discriminants. Conversion functions live here
//! to keep `lib.rs` focused on the `extern "C"` surface.
//!
//! Strings handed to C never fail to convert: an interior NUL yields an
//! empty string rather than a panic.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use cars_core::error::ClientError;
use cars_core::http::HttpMethod;
use cars_core::types::{Brand, Car};

/// Opaque handle to a `CarsClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiCarsClient {
    pub(crate) inner: cars_core::CarsClient,
}

/// Allocate a C string the caller frees with `cars_free_string` (or as part
/// of the struct that owns it).
pub(crate) fn to_c_string(s: &str) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

fn to_c_string_opt(s: Option<&str>) -> *mut c_char {
    s.map_or(std::ptr::null_mut(), to_c_string)
}

/// Read a caller-owned C string. Null or invalid UTF-8 reads as `None`.
pub(crate) fn from_c_str(s: *const c_char) -> Option<String> {
    if s.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(s) }.to_str().ok().map(str::to_string)
}

/// Read caller-owned bytes that are present whenever the pointer is
/// non-null. Invalid UTF-8 is replaced, never dropped.
fn from_c_str_lossy(s: *const c_char) -> Option<String> {
    if s.is_null() {
        return None;
    }
    Some(unsafe { CStr::from_ptr(s) }.to_string_lossy().into_owned())
}

/// Free a C string allocated by `to_c_string`. Null is a no-op.
pub(crate) fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

/// Hand a vector to C as a pointer/length pair. Empty vectors are null.
fn into_raw_parts<T>(items: Vec<T>) -> (*mut T, u32) {
    if items.is_empty() {
        return (std::ptr::null_mut(), 0);
    }
    let boxed = items.into_boxed_slice();
    let len = boxed.len() as u32;
    (Box::into_raw(boxed) as *mut T, len)
}

/// Take back a pointer/length pair produced by `into_raw_parts`.
///
/// # Safety
/// `items` and `len` must come from the same `into_raw_parts` call.
pub(crate) unsafe fn from_raw_parts<T>(items: *mut T, len: u32) -> Vec<T> {
    if items.is_null() || len == 0 {
        return Vec::new();
    }
    let slice = std::ptr::slice_from_raw_parts_mut(items, len as usize);
    unsafe { Box::from_raw(slice) }.into_vec()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Delete = 3,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Delete => FfiHttpMethod::Delete,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `cars_build_*` functions. The C caller executes the request
/// and passes the response back through `cars_parse_*`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub path: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: cars_core::HttpRequest) -> *mut Self {
        let headers: Vec<FfiHeader> = req
            .headers
            .iter()
            .map(|(k, v)| FfiHeader {
                key: to_c_string(k),
                value: to_c_string(v),
            })
            .collect();
        let (headers, headers_len) = into_raw_parts(headers);

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            path: to_c_string(&req.path),
            headers,
            headers_len,
            body: to_c_string_opt(req.body.as_deref()),
        }))
    }

    /// Release every string and the header array, then the request itself.
    ///
    /// # Safety
    /// `req` must come from `from_core` and not have been freed.
    pub(crate) unsafe fn free(req: *mut Self) {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.path);
        free_c_string(req.body);
        for header in unsafe { from_raw_parts(req.headers, req.headers_len) } {
            free_c_string(header.key);
            free_c_string(header.value);
        }
    }
}

// ---------------------------------------------------------------------------
// Caller-provided input (read, never freed by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller fills this in after executing a request. A non-null
/// `transport_error` means the request failed before any response arrived;
/// `status` and `body` are then ignored. A null `body` is an absent body.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
    pub transport_error: *const c_char,
}

impl FfiHttpResponse {
    /// Convert to the core response, or the transport failure it reports.
    pub(crate) fn to_core(&self) -> Result<cars_core::HttpResponse, ClientError> {
        if let Some(message) = from_c_str_lossy(self.transport_error) {
            return Err(ClientError::transport(message));
        }
        Ok(cars_core::HttpResponse::new(
            self.status,
            from_c_str_lossy(self.body).unwrap_or_default(),
        ))
    }
}

/// A car to save, update or delete. `id` may be null for an unsaved car.
#[repr(C)]
pub struct FfiCarInput {
    pub id: *const c_char,
    pub brand: *const c_char,
    pub gas_type: i32,
    pub name: *const c_char,
    pub price: f64,
}

impl FfiCarInput {
    pub(crate) fn to_core(&self) -> Car {
        Car {
            id: from_c_str_lossy(self.id),
            brand: from_c_str_lossy(self.brand).unwrap_or_default(),
            gas_type: self.gas_type,
            name: from_c_str_lossy(self.name).unwrap_or_default(),
            price: self.price,
        }
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiCarsResult` and through the `error_out`
/// parameter of the `cars_build_*` functions.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    InvalidUrl = 1,
    Transport = 2,
    NoResponse = 3,
    NoBody = 4,
    UnexpectedStatus = 5,
    InvalidJson = 6,
    MissingId = 7,
    Serialization = 8,
    Config = 9,
    /// Non-200 answer with a body: nothing to report, no payload.
    Ignored = 10,
    Panic = 11,
    NullArg = 12,
    /// Operation number outside 0..=2.
    UnknownOperation = 13,
}

impl From<&ClientError> for FfiErrorCode {
    fn from(err: &ClientError) -> Self {
        match err {
            ClientError::InvalidUrl(_) => FfiErrorCode::InvalidUrl,
            ClientError::Transport(_) => FfiErrorCode::Transport,
            ClientError::NoResponse => FfiErrorCode::NoResponse,
            ClientError::NoBody => FfiErrorCode::NoBody,
            ClientError::UnexpectedStatus(_) => FfiErrorCode::UnexpectedStatus,
            ClientError::InvalidJson(_) => FfiErrorCode::InvalidJson,
            ClientError::MissingId(_) => FfiErrorCode::MissingId,
            ClientError::Serialization(_) => FfiErrorCode::Serialization,
            ClientError::Config(_) => FfiErrorCode::Config,
        }
    }
}

/// Tag that tells `cars_free_result` what `FfiCarsResult::data` points to.
#[repr(C)]
pub enum FfiDataTag {
    None = 0,
    CarList = 1,
}

/// A single car exposed to C. `id` is null for a car without one.
#[repr(C)]
pub struct FfiCar {
    pub id: *mut c_char,
    pub brand: *mut c_char,
    pub gas_type: i32,
    pub name: *mut c_char,
    pub price: f64,
}

impl FfiCar {
    fn from_core(car: Car) -> Self {
        FfiCar {
            id: to_c_string_opt(car.id.as_deref()),
            brand: to_c_string(&car.brand),
            gas_type: car.gas_type,
            name: to_c_string(&car.name),
            price: car.price,
        }
    }

    fn free_fields(&self) {
        free_c_string(self.id);
        free_c_string(self.brand);
        free_c_string(self.name);
    }
}

/// A list of cars exposed to C.
#[repr(C)]
pub struct FfiCarList {
    pub items: *mut FfiCar,
    pub len: u32,
}

/// A single brand exposed to C. `name` and `key` may be null; `id` is only
/// meaningful when `has_id` is true.
#[repr(C)]
pub struct FfiBrand {
    pub fipe_name: *mut c_char,
    pub name: *mut c_char,
    pub key: *mut c_char,
    pub id: u64,
    pub has_id: bool,
}

/// A list of brands exposed to C. Returned directly by
/// `cars_parse_load_brands`; freed with `cars_free_brand_list`.
#[repr(C)]
pub struct FfiBrandList {
    pub items: *mut FfiBrand,
    pub len: u32,
}

impl FfiBrandList {
    pub(crate) fn from_core(brands: Vec<Brand>) -> *mut Self {
        let items: Vec<FfiBrand> = brands
            .into_iter()
            .map(|b| FfiBrand {
                fipe_name: to_c_string(&b.fipe_name),
                name: to_c_string_opt(b.name.as_deref()),
                key: to_c_string_opt(b.key.as_deref()),
                id: b.id.unwrap_or_default(),
                has_id: b.id.is_some(),
            })
            .collect();
        let (items, len) = into_raw_parts(items);
        Box::into_raw(Box::new(FfiBrandList { items, len }))
    }

    /// # Safety
    /// `list` must come from `from_core` and not have been freed.
    pub(crate) unsafe fn free(list: *mut Self) {
        let list = unsafe { Box::from_raw(list) };
        for brand in unsafe { from_raw_parts(list.items, list.len) } {
            free_c_string(brand.fipe_name);
            free_c_string(brand.name);
            free_c_string(brand.key);
        }
    }
}

/// Result envelope for the car listing.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data`
/// points to an `FfiCarList` (tagged by `data_tag`).
/// On failure `error_code` describes the category, `error_message` is a
/// human-readable C string, and `data` is null. `http_status` is set for
/// `UnexpectedStatus` and `Ignored`.
#[repr(C)]
pub struct FfiCarsResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut std::ffi::c_void,
}

impl FfiCarsResult {
    fn boxed(
        error_code: FfiErrorCode,
        message: Option<&str>,
        http_status: u16,
        data_tag: FfiDataTag,
        data: *mut std::ffi::c_void,
    ) -> *mut Self {
        Box::into_raw(Box::new(FfiCarsResult {
            error_code,
            error_message: to_c_string_opt(message),
            http_status,
            data_tag,
            data,
        }))
    }

    /// Build a success result carrying an `FfiCarList`.
    pub(crate) fn ok_car_list(cars: Vec<Car>) -> *mut Self {
        let items: Vec<FfiCar> = cars.into_iter().map(FfiCar::from_core).collect();
        let (items, len) = into_raw_parts(items);
        let list = Box::into_raw(Box::new(FfiCarList { items, len }));
        Self::boxed(FfiErrorCode::Ok, None, 0, FfiDataTag::CarList, list.cast())
    }

    /// Build the result for a non-200 answer that carried a body.
    pub(crate) fn ignored(status: u16) -> *mut Self {
        let msg = format!("status {status} with a body, ignored");
        Self::boxed(FfiErrorCode::Ignored, Some(&msg), status, FfiDataTag::None, std::ptr::null_mut())
    }

    /// Build an error result from a `ClientError`.
    pub(crate) fn from_error(err: ClientError) -> *mut Self {
        let error_code = FfiErrorCode::from(&err);
        let msg = err.to_string();
        Self::boxed(
            error_code,
            Some(&msg),
            err.status().unwrap_or(0),
            FfiDataTag::None,
            std::ptr::null_mut(),
        )
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        let msg = format!("null argument: {name}");
        Self::boxed(FfiErrorCode::NullArg, Some(&msg), 0, FfiDataTag::None, std::ptr::null_mut())
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::boxed(FfiErrorCode::Panic, Some(msg), 0, FfiDataTag::None, std::ptr::null_mut())
    }

    /// # Safety
    /// `result` must come from one of the constructors above and not have
    /// been freed.
    pub(crate) unsafe fn free(result: *mut Self) {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        if result.data.is_null() {
            return;
        }
        match result.data_tag {
            FfiDataTag::CarList => {
                let list = unsafe { Box::from_raw(result.data as *mut FfiCarList) };
                for car in unsafe { from_raw_parts(list.items, list.len) } {
                    car.free_fields();
                }
            }
            FfiDataTag::None => {}
        }
    }
}
