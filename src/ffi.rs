//! FFI 接口 - C/C++ 绑定

use crate::config::PreviewConfig;
use crate::runtime::{FailureKind, PreviewHost, RenderOutcome};
use std::ffi::{CStr, CString};
use std::os::raw::c_char;

/// 渲染一段组件源码，返回 JSON 字符串形式的结果，需用 `lp_string_free` 释放
#[no_mangle]
pub extern "C" fn lp_render_json(source: *const c_char) -> *mut c_char {
    let outcome = if source.is_null() {
        RenderOutcome::failure(FailureKind::Evaluation, "source is null", Vec::new())
    } else {
        let source = unsafe { CStr::from_ptr(source) }.to_string_lossy().into_owned();
        let mut host = PreviewHost::boot(&PreviewConfig::default());
        host.render_source(source)
    };

    let json = serde_json::to_string(&outcome)
        .unwrap_or_else(|e| format!("{{\"status\":\"failure\",\"message\":\"{}\"}}", e));
    match CString::new(json) {
        Ok(s) => s.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

/// 释放由本库返回的字符串
#[no_mangle]
pub extern "C" fn lp_string_free(s: *mut c_char) {
    if !s.is_null() {
        unsafe { drop(CString::from_raw(s)); }
    }
}
