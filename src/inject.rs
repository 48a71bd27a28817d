//! Injected code fragments and the on-disk patch marker.

/// First line of every patched script. Its presence in the first line of the
/// file is the sole source of truth for "already patched".
pub(crate) const PATCH_MARKER: &str = "// file patched by crankshaft";

/// Publishes the enclosing class instance onto a well-known global so
/// later-loaded plugin scripts can reach it.
pub(crate) const EXPOSE_LINE: &str = "window.coolClass = this;";

/// Build the bootstrap fragment inserted at the top of the patched script.
///
/// On page load it asks the locally running Crankshaft server to complete
/// the injection with a JSON-RPC shaped POST. Generated fresh each run with
/// the server port substituted in.
pub(crate) fn bootstrap_script(server_port: u16) -> String {
    format!(
        r#"{PATCH_MARKER}
console.info('[Crankshaft] Loading patched libraryroot~sp.js');

window.addEventListener('load', () => {{
  console.info('[Crankshaft] Page loading, making request to inject service');
  fetch('http://localhost:{server_port}/rpc', {{
    method: 'POST',
    headers: {{
      'Content-Type': 'application/json',
    }},
    body: JSON.stringify({{
      method: 'InjectService.Inject',
      params: [],
      id: Date.now(),
    }}),
  }});
}});"#
    )
}
