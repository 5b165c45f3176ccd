use std::path::{Path, PathBuf};

use mlua::Lua;

use crate::Result;

fn prepend_package_search_path(package: &mlua::Table, key: &str, prefix: &str) -> Result<()> {
    let prefix = prefix.trim();
    if prefix.is_empty() {
        return Ok(());
    }

    let prefix = prefix.trim_end_matches(';');
    let old: String = package.get(key)?;
    package.set(key, format!("{prefix};{old}"))?;
    Ok(())
}

fn script_dir(script_path: &Path) -> PathBuf {
    script_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
}

fn normalize_for_lua_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

pub(crate) fn chunk_name(script_path: &Path) -> String {
    let p = script_path
        .canonicalize()
        .unwrap_or_else(|_| script_path.to_path_buf());
    format!("@{}", normalize_for_lua_path(&p))
}

/// Lets the script `require` modules that sit next to it, plus anything on `LUA_PATH`/`LUA_CPATH`.
pub(crate) fn configure_module_path(lua: &Lua, script_path: &Path) -> Result<()> {
    let package: mlua::Table = lua.globals().get("package")?;

    if let Ok(v) = std::env::var("LUA_PATH") {
        prepend_package_search_path(&package, "path", &v)?;
    }
    if let Ok(v) = std::env::var("LUA_CPATH") {
        prepend_package_search_path(&package, "cpath", &v)?;
    }

    let dir = script_dir(script_path);
    let dir = if dir.as_os_str().is_empty() {
        ".".to_string()
    } else {
        normalize_for_lua_path(&dir)
    };

    prepend_package_search_path(&package, "path", &format!("{dir}/?.lua;{dir}/?/init.lua"))
}
