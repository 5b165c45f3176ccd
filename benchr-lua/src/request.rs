use std::time::Duration;

use benchr_core::{RequestMethod, RequestOptions};
use mlua::{UserData, UserDataMethods};

/// Mutable request handle passed to the script's `request(req)`.
pub(crate) struct LuaRequest(pub(crate) RequestOptions);

impl UserData for LuaRequest {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method("url", |_, this, ()| Ok(this.0.url().to_string()));
        methods.add_method("method", |_, this, ()| Ok(this.0.method().to_string()));

        methods.add_method_mut("set_url", |_, this, url: String| {
            this.0.set_url(&url);
            Ok(())
        });
        methods.add_method_mut("set_method", |_, this, method: String| {
            let method = RequestMethod::parse(&method).map_err(mlua::Error::external)?;
            this.0.set_method(method);
            Ok(())
        });
        methods.add_method_mut("set_header", |_, this, (name, value): (String, String)| {
            this.0.set_header(name, value);
            Ok(())
        });
        methods.add_method_mut("set_param", |_, this, (name, value): (String, String)| {
            this.0.set_param(name, value);
            Ok(())
        });
        methods.add_method_mut("set_body", |_, this, body: mlua::String| {
            this.0.set_body(body.as_bytes().to_vec());
            Ok(())
        });
        methods.add_method_mut("set_timeout", |_, this, ms: u64| {
            this.0.set_timeout(Duration::from_millis(ms));
            Ok(())
        });
    }
}
