//! Integration tests for palisade-core

use palisade_core::*;

#[test]
fn test_request_lifecycle() {
    let req = HttpRequest::new(HttpMethod::POST, "/cart?coupon=SPRING")
        .with_form(&[("item", "42"), ("qty", "2")]);
    let mut ctx = ActionContext::new(req);
    ctx.attach_session(Session::generate());

    assert_eq!(ctx.param_value("coupon").as_deref(), Some("SPRING"));
    assert_eq!(ctx.param_value("qty").as_deref(), Some("2"));
    assert!(ctx.was_unauthenticated());

    ctx.session_mut().login("carol");
    ctx.session_mut().set("cart", vec![42]).unwrap();
    ctx.resp_mut().set_cookie(Cookie::new("seen", "1").with_path("/"));
    ctx.set_render_arg("title", "Cart");

    let session = ctx.take_session().unwrap();
    assert_eq!(session.username(), Some("carol"));
    assert_eq!(session.get::<Vec<u32>>("cart"), Some(vec![42]));

    let response = ctx.into_response();
    assert_eq!(response.set_cookie_headers(), vec!["seen=1; Path=/"]);
}

#[test]
fn test_sealed_values_survive_transport() {
    let crypto = HmacCrypto::new(HmacCrypto::generate_secret()).unwrap();
    let sealed = crypto.encrypt("visit-1:carol").unwrap();

    let req = HttpRequest::new(HttpMethod::GET, "/").with_header("X-Token", sealed.as_str());
    let received = req.header("x-token").unwrap();
    assert_eq!(crypto.decrypt(received).unwrap(), "visit-1:carol");
}

#[test]
fn test_rejection_handlers() {
    let ctx = ActionContext::new(HttpRequest::new(HttpMethod::POST, "/"));

    let redirect = RedirectToLogin::new("/signin").result(&ctx);
    assert_eq!(redirect.status, 303);
    assert_eq!(redirect.headers.get("Location").map(String::as_str), Some("/signin"));

    let rejection = StatusRejection::default().result(&ctx);
    assert_eq!(rejection.status, 403);
    let body: serde_json::Value = serde_json::from_slice(&rejection.body).unwrap();
    assert_eq!(body["status"], 403);
}

#[test]
fn test_error_status_codes() {
    assert_eq!(Error::Forbidden("x".into()).status_code(), 403);
    assert!(Error::NotFound("x".into()).is_client_error());
    assert!(Error::Crypto("x".into()).is_server_error());
}
