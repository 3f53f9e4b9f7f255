// Floatshell desktop host
// Uses `wry` child webviews inside one `tao` window:
// - Windows: WebView2
// - Linux: WebKitGTK (X11)
// - macOS: WKWebView
//
// The navbar and overlay are HTML panels talking to the shell over wry IPC;
// each tab is its own child webview.

pub mod panels;
pub mod surfaces;
pub mod webview_app;
