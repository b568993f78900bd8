//! C-ABI wrapper around `cars-core`.
//!
//! # Overview
//! Exposes the cars API through `extern "C"` functions so a native host app
//! can build requests, run them on its own networking stack, and classify
//! the responses without linking to Rust's async runtime.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Per-operation `build_*` / `parse_*` mirrors the core API 1:1, including
//!   its reporting strengths: the car listing returns an `FfiCarsResult`,
//!   the brands listing returns a list or null, writes return a `bool`.
//! - The C caller owns all returned pointers and must call the matching
//!   `cars_free_*` function to release them.

pub mod types;

use std::os::raw::c_char;
use std::panic::catch_unwind;

use cars_core::config::DEFAULT_BRANDS_URL;
use cars_core::types::Operation;
use cars_core::{ClientError, HttpRequest};

use types::*;

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new `CarsClient` for `base_url`.
///
/// `brands_url` may be null to use the public FIPE brands list.
/// Returns null if `base_url` is null or not UTF-8, or if an internal panic
/// occurs. The caller must free the returned pointer with `cars_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn cars_client_new(
    base_url: *const c_char,
    brands_url: *const c_char,
) -> *mut FfiCarsClient {
    catch_unwind(|| {
        let Some(base) = from_c_str(base_url) else {
            return std::ptr::null_mut();
        };
        let brands = from_c_str(brands_url).unwrap_or_else(|| DEFAULT_BRANDS_URL.to_string());
        let client = cars_core::CarsClient::new(&base, &brands);
        Box::into_raw(Box::new(FfiCarsClient { inner: client }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a `CarsClient` created by `cars_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn cars_client_free(client: *mut FfiCarsClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Store `code` through `error_out` when the caller passed one.
fn report(error_out: *mut FfiErrorCode, code: FfiErrorCode) {
    if !error_out.is_null() {
        unsafe { *error_out = code };
    }
}

/// Hand a built request to C, or record why it could not be built.
fn finish_build(
    built: Result<HttpRequest, ClientError>,
    error_out: *mut FfiErrorCode,
) -> *mut FfiHttpRequest {
    match built {
        Ok(req) => {
            report(error_out, FfiErrorCode::Ok);
            FfiHttpRequest::from_core(req)
        }
        Err(e) => {
            report(error_out, FfiErrorCode::from(&e));
            std::ptr::null_mut()
        }
    }
}

/// Build the request that lists every car.
///
/// Returns null if `client` is null or its base URL is invalid; the reason
/// (`NullArg`, `InvalidUrl`) is written to `error_out` when it is non-null.
/// The caller must free the returned pointer with `cars_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn cars_build_load_cars(
    client: *const FfiCarsClient,
    error_out: *mut FfiErrorCode,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            report(error_out, FfiErrorCode::NullArg);
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        finish_build(client.inner.build_load_cars(), error_out)
    })
    .unwrap_or_else(|_| {
        report(error_out, FfiErrorCode::Panic);
        std::ptr::null_mut()
    })
}

/// Build the request that lists the brands.
///
/// Returns null if `client` is null or its brands URL is invalid, writing
/// the reason to `error_out` when it is non-null.
#[unsafe(no_mangle)]
pub extern "C" fn cars_build_load_brands(
    client: *const FfiCarsClient,
    error_out: *mut FfiErrorCode,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            report(error_out, FfiErrorCode::NullArg);
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        finish_build(client.inner.build_load_brands(), error_out)
    })
    .unwrap_or_else(|_| {
        report(error_out, FfiErrorCode::Panic);
        std::ptr::null_mut()
    })
}

/// Build the request for a write operation on `car`.
///
/// `operation`: 0 = save, 1 = update, 2 = delete.
/// Returns null if `client` or `car` is null (`NullArg`), `operation` is out
/// of range (`UnknownOperation`), the car has no id for an update or delete
/// (`MissingId`), or the URL is invalid (`InvalidUrl`). The code is written
/// to `error_out` when it is non-null. A null request means the write failed
/// without being sent.
#[unsafe(no_mangle)]
pub extern "C" fn cars_build_operation(
    client: *const FfiCarsClient,
    car: *const FfiCarInput,
    operation: u32,
    error_out: *mut FfiErrorCode,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() || car.is_null() {
            report(error_out, FfiErrorCode::NullArg);
            return std::ptr::null_mut();
        }
        let operation = match operation {
            0 => Operation::Save,
            1 => Operation::Update,
            2 => Operation::Delete,
            _ => {
                report(error_out, FfiErrorCode::UnknownOperation);
                return std::ptr::null_mut();
            }
        };
        let client = unsafe { &*client };
        let car = unsafe { &*car }.to_core();
        finish_build(client.inner.build_operation(&car, operation), error_out)
    })
    .unwrap_or_else(|_| {
        report(error_out, FfiErrorCode::Panic);
        std::ptr::null_mut()
    })
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Classify the response to a car listing.
///
/// Returns a result with `data_tag = CarList` on success, `Ignored` for a
/// non-200 answer that carried a body, and the matching error code otherwise.
#[unsafe(no_mangle)]
pub extern "C" fn cars_parse_load_cars(
    client: *const FfiCarsClient,
    response: *const FfiHttpResponse,
) -> *mut FfiCarsResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiCarsResult::null_arg("client");
        }
        if response.is_null() {
            return FfiCarsResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        let core_resp = match resp.to_core() {
            Ok(core_resp) => core_resp,
            Err(e) => return FfiCarsResult::from_error(e),
        };
        let status = core_resp.status;
        match client.inner.parse_load_cars(core_resp) {
            Ok(Some(cars)) => FfiCarsResult::ok_car_list(cars),
            Ok(None) => FfiCarsResult::ignored(status),
            Err(e) => FfiCarsResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiCarsResult::panic("panic in cars_parse_load_cars"))
}

/// Classify the response to a brands listing.
///
/// Returns null on any failure, including null arguments.
/// The caller must free a non-null result with `cars_free_brand_list`.
#[unsafe(no_mangle)]
pub extern "C" fn cars_parse_load_brands(
    client: *const FfiCarsClient,
    response: *const FfiHttpResponse,
) -> *mut FfiBrandList {
    catch_unwind(|| {
        if client.is_null() || response.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        resp.to_core()
            .ok()
            .and_then(|core_resp| client.inner.parse_load_brands(core_resp))
            .map_or(std::ptr::null_mut(), FfiBrandList::from_core)
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Classify the response to a save, update or delete.
///
/// True only for status 200 with a body. Null arguments and transport
/// failures are false.
#[unsafe(no_mangle)]
pub extern "C" fn cars_parse_operation(
    client: *const FfiCarsClient,
    response: *const FfiHttpResponse,
) -> bool {
    catch_unwind(|| {
        if client.is_null() || response.is_null() {
            return false;
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        resp.to_core()
            .map(|core_resp| client.inner.parse_operation(core_resp))
            .unwrap_or(false)
    })
    .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by any `cars_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn cars_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| unsafe { FfiHttpRequest::free(req) });
}

/// Free an `FfiCarsResult` returned by `cars_parse_load_cars`.
/// Safe to call with null. Uses `data_tag` to determine what `data` points to.
#[unsafe(no_mangle)]
pub extern "C" fn cars_free_result(result: *mut FfiCarsResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| unsafe { FfiCarsResult::free(result) });
}

/// Free an `FfiBrandList` returned by `cars_parse_load_brands`.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn cars_free_brand_list(list: *mut FfiBrandList) {
    if list.is_null() {
        return;
    }
    let _ = catch_unwind(|| unsafe { FfiBrandList::free(list) });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn cars_free_string(s: *mut c_char) {
    let _ = catch_unwind(|| free_c_string(s));
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::{CStr, CString};

    const BASE: &str = "http://localhost:3000/cars";

    fn new_client() -> *mut FfiCarsClient {
        let url = CString::new(BASE).unwrap();
        let brands = CString::new("http://localhost:3000/brands").unwrap();
        cars_client_new(url.as_ptr(), brands.as_ptr())
    }

    fn response(status: u16, body: &CString) -> FfiHttpResponse {
        FfiHttpResponse {
            status,
            body: body.as_ptr(),
            transport_error: std::ptr::null(),
        }
    }

    fn c_str<'a>(s: *const c_char) -> &'a str {
        unsafe { CStr::from_ptr(s) }.to_str().unwrap()
    }

    #[test]
    fn client_new_and_free() {
        let client = new_client();
        assert!(!client.is_null());
        cars_client_free(client);
    }

    #[test]
    fn client_new_null_base_returns_null() {
        let client = cars_client_new(std::ptr::null(), std::ptr::null());
        assert!(client.is_null());
    }

    #[test]
    fn client_new_null_brands_uses_default() {
        let url = CString::new(BASE).unwrap();
        let client = cars_client_new(url.as_ptr(), std::ptr::null());
        let req = cars_build_load_brands(client, std::ptr::null_mut());
        let path = c_str(unsafe { &*req }.path);
        assert_eq!(path, DEFAULT_BRANDS_URL);

        cars_free_request(req);
        cars_client_free(client);
    }

    #[test]
    fn client_free_null_is_safe() {
        cars_client_free(std::ptr::null_mut());
    }

    #[test]
    fn build_load_cars_returns_correct_request() {
        let client = new_client();
        let req = cars_build_load_cars(client, std::ptr::null_mut());
        assert!(!req.is_null());

        let req_ref = unsafe { &*req };
        assert!(matches!(req_ref.method, FfiHttpMethod::Get));
        assert_eq!(c_str(req_ref.path), BASE);
        assert!(req_ref.body.is_null());
        assert_eq!(req_ref.headers_len, 1);
        let header = unsafe { &*req_ref.headers };
        assert_eq!(c_str(header.key), "content-type");
        assert_eq!(c_str(header.value), "application/json");

        cars_free_request(req);
        cars_client_free(client);
    }

    #[test]
    fn build_load_cars_null_client_reports_null_arg() {
        let mut code = FfiErrorCode::Ok;
        assert!(cars_build_load_cars(std::ptr::null(), &mut code).is_null());
        assert_eq!(code, FfiErrorCode::NullArg);
        assert!(cars_build_load_cars(std::ptr::null(), std::ptr::null_mut()).is_null());
    }

    #[test]
    fn build_load_cars_invalid_url_reports_invalid_url() {
        let url = CString::new("not a url").unwrap();
        let client = cars_client_new(url.as_ptr(), std::ptr::null());
        let mut code = FfiErrorCode::Ok;
        assert!(cars_build_load_cars(client, &mut code).is_null());
        assert_eq!(code, FfiErrorCode::InvalidUrl);
        cars_client_free(client);
    }

    #[test]
    fn build_success_reports_ok() {
        let client = new_client();
        let mut code = FfiErrorCode::Panic;
        let req = cars_build_load_brands(client, &mut code);
        assert!(!req.is_null());
        assert_eq!(code, FfiErrorCode::Ok);
        cars_free_request(req);
        cars_client_free(client);
    }

    #[test]
    fn build_save_without_id_posts_to_trailing_slash() {
        let client = new_client();
        let name = CString::new("Fusca").unwrap();
        let brand = CString::new("Volkswagen").unwrap();
        let car = FfiCarInput {
            id: std::ptr::null(),
            brand: brand.as_ptr(),
            gas_type: 0,
            name: name.as_ptr(),
            price: 8000.0,
        };
        let req = cars_build_operation(client, &car, 0, std::ptr::null_mut());
        assert!(!req.is_null());

        let req_ref = unsafe { &*req };
        assert!(matches!(req_ref.method, FfiHttpMethod::Post));
        assert_eq!(c_str(req_ref.path), "http://localhost:3000/cars/");
        let body: serde_json::Value = serde_json::from_str(c_str(req_ref.body)).unwrap();
        assert_eq!(body["name"], "Fusca");
        assert_eq!(body["brand"], "Volkswagen");
        assert!(body.get("_id").is_none());

        cars_free_request(req);
        cars_client_free(client);
    }

    #[test]
    fn build_update_and_delete_target_the_id() {
        let client = new_client();
        let id = CString::new("42").unwrap();
        let name = CString::new("Uno").unwrap();
        let car = FfiCarInput {
            id: id.as_ptr(),
            brand: std::ptr::null(),
            gas_type: 1,
            name: name.as_ptr(),
            price: 0.0,
        };

        let req = cars_build_operation(client, &car, 1, std::ptr::null_mut());
        let req_ref = unsafe { &*req };
        assert!(matches!(req_ref.method, FfiHttpMethod::Put));
        assert_eq!(c_str(req_ref.path), "http://localhost:3000/cars/42");
        cars_free_request(req);

        let req = cars_build_operation(client, &car, 2, std::ptr::null_mut());
        let req_ref = unsafe { &*req };
        assert!(matches!(req_ref.method, FfiHttpMethod::Delete));
        assert_eq!(c_str(req_ref.path), "http://localhost:3000/cars/42");
        cars_free_request(req);

        cars_client_free(client);
    }

    #[test]
    fn build_delete_without_id_reports_missing_id() {
        let client = new_client();
        let car = FfiCarInput {
            id: std::ptr::null(),
            brand: std::ptr::null(),
            gas_type: 0,
            name: std::ptr::null(),
            price: 0.0,
        };
        let mut code = FfiErrorCode::Ok;
        assert!(cars_build_operation(client, &car, 2, &mut code).is_null());
        assert_eq!(code, FfiErrorCode::MissingId);
        assert!(cars_build_operation(client, &car, 7, &mut code).is_null());
        assert_eq!(code, FfiErrorCode::UnknownOperation);
        assert!(cars_build_operation(client, std::ptr::null(), 0, &mut code).is_null());
        assert_eq!(code, FfiErrorCode::NullArg);
        cars_client_free(client);
    }

    #[test]
    fn parse_load_cars_one_car() {
        let client = new_client();
        let body = CString::new(r#"[{"id":"1","name":"Fusca"}]"#).unwrap();
        let result = cars_parse_load_cars(client, &response(200, &body));
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert!(r.error_message.is_null());
        assert!(matches!(r.data_tag, FfiDataTag::CarList));

        let list = unsafe { &*(r.data as *const FfiCarList) };
        assert_eq!(list.len, 1);
        let items = unsafe { std::slice::from_raw_parts(list.items, list.len as usize) };
        assert_eq!(c_str(items[0].id), "1");
        assert_eq!(c_str(items[0].name), "Fusca");
        assert_eq!(c_str(items[0].brand), "");

        cars_free_result(result);
        cars_client_free(client);
    }

    #[test]
    fn parse_load_cars_empty_list() {
        let client = new_client();
        let body = CString::new("[]").unwrap();
        let result = cars_parse_load_cars(client, &response(200, &body));
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        let list = unsafe { &*(r.data as *const FfiCarList) };
        assert_eq!(list.len, 0);
        assert!(list.items.is_null());

        cars_free_result(result);
        cars_client_free(client);
    }

    #[test]
    fn parse_load_cars_error_codes() {
        let client = new_client();
        let cases = [
            (404, "", FfiErrorCode::UnexpectedStatus, 404),
            (200, "", FfiErrorCode::NoBody, 0),
            (200, "not json", FfiErrorCode::InvalidJson, 0),
            (0, "", FfiErrorCode::NoResponse, 0),
            (500, "boom", FfiErrorCode::Ignored, 500),
        ];
        for (status, body, code, http_status) in cases {
            let body = CString::new(body).unwrap();
            let result = cars_parse_load_cars(client, &response(status, &body));
            let r = unsafe { &*result };
            assert_eq!(r.error_code, code, "status {status}");
            assert_eq!(r.http_status, http_status, "status {status}");
            assert!(!r.error_message.is_null());
            assert!(r.data.is_null());
            cars_free_result(result);
        }
        cars_client_free(client);
    }

    #[test]
    fn parse_load_cars_transport_error() {
        let client = new_client();
        let message = CString::new("connection refused").unwrap();
        let resp = FfiHttpResponse {
            status: 200,
            body: std::ptr::null(),
            transport_error: message.as_ptr(),
        };
        let result = cars_parse_load_cars(client, &resp);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Transport);
        assert!(c_str(r.error_message).contains("connection refused"));

        cars_free_result(result);
        cars_client_free(client);
    }

    #[test]
    fn parse_null_client_returns_null_arg() {
        let body = CString::new("[]").unwrap();
        let result = cars_parse_load_cars(std::ptr::null(), &response(200, &body));
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::NullArg);
        cars_free_result(result);
    }

    #[test]
    fn parse_null_response_returns_null_arg() {
        let client = new_client();
        let result = cars_parse_load_cars(client, std::ptr::null());
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::NullArg);
        cars_free_result(result);
        cars_client_free(client);
    }

    #[test]
    fn parse_load_brands_success() {
        let client = new_client();
        let body = CString::new(r#"[{"fipe_name":"Fiat","id":21},{"fipe_name":"Ford"}]"#).unwrap();
        let list = cars_parse_load_brands(client, &response(200, &body));
        assert!(!list.is_null());

        let list_ref = unsafe { &*list };
        assert_eq!(list_ref.len, 2);
        let items = unsafe { std::slice::from_raw_parts(list_ref.items, 2) };
        assert_eq!(c_str(items[0].fipe_name), "Fiat");
        assert!(items[0].has_id);
        assert_eq!(items[0].id, 21);
        assert!(!items[1].has_id);
        assert!(items[1].name.is_null());

        cars_free_brand_list(list);
        cars_client_free(client);
    }

    #[test]
    fn parse_load_brands_failure_is_null() {
        let client = new_client();
        let body = CString::new("oops").unwrap();
        assert!(cars_parse_load_brands(client, &response(500, &body)).is_null());
        assert!(cars_parse_load_brands(client, &response(200, &body)).is_null());
        assert!(cars_parse_load_brands(client, std::ptr::null()).is_null());
        cars_client_free(client);
    }

    #[test]
    fn parse_operation_outcomes() {
        let client = new_client();
        let body = CString::new("{}").unwrap();
        let empty = CString::new("").unwrap();
        assert!(cars_parse_operation(client, &response(200, &body)));
        assert!(!cars_parse_operation(client, &response(201, &body)));
        assert!(!cars_parse_operation(client, &response(200, &empty)));
        assert!(!cars_parse_operation(client, std::ptr::null()));

        let message = CString::new("timed out").unwrap();
        let failed = FfiHttpResponse {
            status: 200,
            body: body.as_ptr(),
            transport_error: message.as_ptr(),
        };
        assert!(!cars_parse_operation(client, &failed));

        cars_client_free(client);
    }

    #[test]
    fn non_utf8_body_is_still_a_body() {
        let client = new_client();
        let body = CString::new(vec![0xff, 0xfe]).unwrap();

        let result = cars_parse_load_cars(client, &response(200, &body));
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::InvalidJson);
        cars_free_result(result);

        assert!(cars_parse_operation(client, &response(200, &body)));
        cars_client_free(client);
    }

    #[test]
    fn non_utf8_transport_error_is_still_a_transport_error() {
        let client = new_client();
        let body = CString::new("{}").unwrap();
        let message = CString::new(vec![b'r', b'e', b's', b'e', b't', 0xff]).unwrap();
        let failed = FfiHttpResponse {
            status: 200,
            body: body.as_ptr(),
            transport_error: message.as_ptr(),
        };

        let result = cars_parse_load_cars(client, &failed);
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::Transport);
        cars_free_result(result);

        assert!(!cars_parse_operation(client, &failed));
        assert!(cars_parse_load_brands(client, &failed).is_null());
        cars_client_free(client);
    }

    #[test]
    fn free_functions_accept_null() {
        cars_free_request(std::ptr::null_mut());
        cars_free_result(std::ptr::null_mut());
        cars_free_brand_list(std::ptr::null_mut());
        cars_free_string(std::ptr::null_mut());
    }
}
