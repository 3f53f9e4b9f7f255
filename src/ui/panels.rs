// Floatshell panel markup
// Markup and scripts for the navbar and overlay panels, and the script injected
// into every content page.
//
// Panels talk to the shell with `window.ipc.postMessage('{"cmd": ...}')` and
// receive notifications through `window.__floatshell.receive(event)`.

/// Shared bridge: posting, shortcut forwarding, notification fan-out.
const BRIDGE_JS: &str = r#"
window.__floatshell = (function () {
  var handlers = [];
  function send(msg) { window.ipc.postMessage(JSON.stringify(msg)); }
  function chord(e) {
    var named = { '+': 'Plus', '=': 'Plus', '-': 'Minus', ',': 'Comma', ' ': 'Space',
                  'ArrowLeft': 'Left', 'ArrowRight': 'Right' };
    var key = named[e.key] || e.key;
    var parts = [];
    if (e.ctrlKey) parts.push('Ctrl');
    if (e.metaKey) parts.push('Cmd');
    if (e.altKey) parts.push('Alt');
    if (e.shiftKey && e.key !== '+') parts.push('Shift');
    parts.push(key.length === 1 ? key.toUpperCase() : key);
    return parts.join('+');
  }
  document.addEventListener('keydown', function (e) {
    var modified = e.ctrlKey || e.metaKey || e.altKey;
    if (!modified && e.key !== 'Escape' && !/^F\d+$/.test(e.key)) return;
    if (['Control', 'Meta', 'Alt', 'Shift'].indexOf(e.key) >= 0) return;
    send({ cmd: 'shortcut', keys: chord(e) });
    if (modified) e.preventDefault();
  }, true);
  return {
    send: send,
    on: function (fn) { handlers.push(fn); },
    receive: function (ev) { handlers.forEach(function (fn) { fn(ev); }); }
  };
})();
"#;

const PANEL_CSS: &str = r#"
:root { --bg: #161b22; --bg2: #0d1117; --fg: #e6edf3; --muted: #7d8590; --border: #30363d; --accent: #2f81f7; }
* { margin: 0; padding: 0; box-sizing: border-box; }
html, body { height: 100%; overflow: hidden; background: var(--bg); color: var(--fg);
  font: 12px -apple-system, BlinkMacSystemFont, "Segoe UI", Helvetica, Arial, sans-serif; user-select: none; }
button { background: none; border: 0; color: var(--fg); cursor: pointer; padding: 4px 7px; border-radius: 5px; }
button:hover { background: var(--border); }
input { background: var(--bg2); color: var(--fg); border: 1px solid var(--border); border-radius: 6px; padding: 4px 8px; outline: none; }
input:focus { border-color: var(--accent); }
"#;

const NAVBAR_BODY: &str = r#"
<div id="bar">
  <div id="tabs"></div>
  <button id="new" title="New tab">+</button>
  <button id="back" title="Back">&#8592;</button>
  <button id="fwd" title="Forward">&#8594;</button>
  <button id="reload" title="Reload">&#8635;</button>
  <input id="address" spellcheck="false" placeholder="Search or enter address">
  <span id="zoom"></span>
  <button id="search" title="Search">&#9906;</button>
  <button id="settings" title="Settings">&#9881;</button>
  <button id="detach" title="Detach">&#9635;</button>
  <button id="hide" title="Hide bar">&#8963;</button>
</div>
"#;

const NAVBAR_CSS: &str = r#"
#bar { display: flex; align-items: center; gap: 4px; height: 100%; padding: 0 6px; border-bottom: 1px solid var(--border); }
#tabs { display: flex; gap: 2px; max-width: 45%; overflow: hidden; }
.tab { max-width: 140px; padding: 4px 8px; border-radius: 5px; white-space: nowrap; overflow: hidden; text-overflow: ellipsis; cursor: default; }
.tab.active { background: var(--border); }
.tab .x { margin-left: 6px; color: var(--muted); cursor: pointer; }
#address { flex: 1; min-width: 80px; }
#zoom { color: var(--muted); min-width: 36px; text-align: right; }
"#;

const NAVBAR_JS: &str = r#"
(function () {
  var fs = window.__floatshell, tabs = [], activeId = null;
  var $ = function (id) { return document.getElementById(id); };
  function render() {
    var strip = $('tabs');
    strip.innerHTML = '';
    tabs.forEach(function (t) {
      var el = document.createElement('div');
      el.className = 'tab' + (t.id === activeId ? ' active' : '');
      el.textContent = (t.loading ? '… ' : '') + t.title;
      el.title = t.url;
      el.onclick = function () { fs.send({ cmd: 'switch_tab', id: t.id }); };
      var x = document.createElement('span');
      x.className = 'x';
      x.textContent = '×';
      x.onclick = function (e) { e.stopPropagation(); fs.send({ cmd: 'close_tab', id: t.id }); };
      el.appendChild(x);
      strip.appendChild(el);
    });
    var active = tabs.filter(function (t) { return t.id === activeId; })[0];
    if (active && document.activeElement !== $('address')) $('address').value = active.url;
  }
  fs.on(function (ev) {
    if (ev.type === 'tabs-changed') { tabs = ev.tabs; activeId = ev.activeTabId; render(); }
    if (ev.type === 'zoom-changed') $('zoom').textContent = ev.percentage === 100 ? '' : ev.percentage + '%';
    if (ev.type === 'focus-address-bar') { $('address').focus(); $('address').select(); }
    if (ev.type === 'state') { tabs = ev.tabs; activeId = ev.activeTabId; render(); }
  });
  $('new').onclick = function () { fs.send({ cmd: 'create_tab' }); };
  $('back').onclick = function () { fs.send({ cmd: 'back' }); };
  $('fwd').onclick = function () { fs.send({ cmd: 'forward' }); };
  $('reload').onclick = function () { fs.send({ cmd: 'reload' }); };
  $('search').onclick = function () { fs.send({ cmd: 'set_overlay_mode', mode: 'search' }); };
  $('settings').onclick = function () { fs.send({ cmd: 'set_overlay_mode', mode: 'settings' }); };
  $('detach').onclick = function () { fs.send({ cmd: 'toggle_detached_mode' }); };
  $('hide').onclick = function () { fs.send({ cmd: 'set_nav_bar_visible', visible: false }); };
  $('address').addEventListener('keydown', function (e) {
    if (e.key === 'Enter' && e.target.value.trim()) {
      fs.send({ cmd: 'navigate', url: e.target.value.trim() });
      e.target.blur();
    }
  });
  $('bar').addEventListener('mousedown', function (e) {
    if (e.target.id === 'bar' || e.target.id === 'tabs') fs.send({ cmd: 'drag_window' });
  });
  fs.send({ cmd: 'get_state' });
})();
"#;

const OVERLAY_BODY: &str = r#"
<div id="drag" class="mode"></div>
<div id="search" class="mode"><input id="query" spellcheck="false" placeholder="Search the web"></div>
<div id="settings" class="mode">
  <h3>Settings</h3>
  <label>Landing page <input id="landing" data-key="general.landing_url"></label>
  <label>Default zoom % <input id="zoomdef" type="number" min="50" max="200" step="10" data-key="zoom.default_zoom_percent"></label>
  <label>Opacity <input id="opacity" type="number" min="0.2" max="1" step="0.05" data-key="window.opacity"></label>
  <label><input id="ontop" type="checkbox" data-key="window.always_on_top"> Always on top</label>
  <label><input id="restore" type="checkbox" data-key="general.restore_session"> Restore tabs on start</label>
  <button id="close">Done</button>
</div>
"#;

const OVERLAY_CSS: &str = r#"
.mode { display: none; height: 100%; }
#drag { background: transparent; cursor: grab; }
#drag:hover { background: var(--border); }
#search { padding: 10px; border: 1px solid var(--border); border-radius: 8px; }
#query { width: 100%; }
#settings { padding: 16px; overflow-y: auto; }
#settings h3 { margin-bottom: 12px; }
#settings label { display: block; margin: 8px 0; color: var(--muted); }
#settings label input:not([type=checkbox]) { display: block; width: 100%; margin-top: 4px; }
"#;

const OVERLAY_JS: &str = r#"
(function () {
  var fs = window.__floatshell;
  var $ = function (id) { return document.getElementById(id); };
  function show(mode) {
    ['drag', 'search', 'settings'].forEach(function (m) { $(m).style.display = 'none'; });
    var el = { 'drag-strip': 'drag', 'search': 'search', 'settings': 'settings' }[mode];
    if (el) $(el).style.display = 'block';
    if (mode === 'search') $('query').focus();
    if (mode === 'settings') fs.send({ cmd: 'get_settings' });
  }
  function fill(s) {
    $('landing').value = s.general.landing_url;
    $('zoomdef').value = s.zoom.default_zoom_percent;
    $('opacity').value = s.window.opacity;
    $('ontop').checked = s.window.always_on_top;
    $('restore').checked = s.general.restore_session;
  }
  fs.on(function (ev) {
    if (ev.type === 'overlay-mode-changed') show(ev.mode);
    if (ev.type === 'state') show(ev.overlayMode);
    if (ev.type === 'settings') fill(ev.settings);
  });
  document.querySelectorAll('[data-key]').forEach(function (input) {
    input.addEventListener('change', function () {
      var v = input.type === 'checkbox' ? input.checked
            : input.type === 'number' ? Number(input.value) : input.value;
      fs.send({ cmd: 'set_setting', key: input.dataset.key, value: v });
    });
  });
  $('query').addEventListener('keydown', function (e) {
    if (e.key === 'Enter' && e.target.value.trim()) {
      fs.send({ cmd: 'navigate', url: e.target.value.trim() });
      e.target.value = '';
      fs.send({ cmd: 'set_overlay_mode', mode: 'none' });
    }
  });
  $('close').onclick = function () { fs.send({ cmd: 'set_overlay_mode', mode: 'none' }); };
  $('drag').addEventListener('mousedown', function () { fs.send({ cmd: 'drag_window' }); });
  $('drag').addEventListener('dblclick', function () { fs.send({ cmd: 'set_nav_bar_visible', visible: true }); });
  fs.send({ cmd: 'get_state' });
})();
"#;

/// Injected into every content page: favicon and fullscreen reporting, shortcut forwarding.
pub const CONTENT_JS: &str = r#"
(function () {
  if (window.__floatshellContent) return;
  window.__floatshellContent = true;
  function post(msg) { try { window.ipc.postMessage(JSON.stringify(msg)); } catch (e) {} }
  function favicon() {
    var link = document.querySelector('link[rel~="icon"]');
    post({ kind: 'favicon', href: link ? link.href : null });
  }
  if (document.readyState === 'loading') document.addEventListener('DOMContentLoaded', favicon);
  else favicon();
  document.addEventListener('fullscreenchange', function () {
    post({ kind: 'fullscreen', enabled: !!document.fullscreenElement });
  });
  document.addEventListener('keydown', function (e) {
    var modified = e.ctrlKey || e.metaKey || e.altKey;
    if (!modified && !/^F\d+$/.test(e.key)) return;
    if (['Control', 'Meta', 'Alt', 'Shift'].indexOf(e.key) >= 0) return;
    var named = { '+': 'Plus', '=': 'Plus', '-': 'Minus', ',': 'Comma', 'ArrowLeft': 'Left', 'ArrowRight': 'Right' };
    var key = named[e.key] || e.key;
    var parts = [];
    if (e.ctrlKey) parts.push('Ctrl');
    if (e.metaKey) parts.push('Cmd');
    if (e.altKey) parts.push('Alt');
    if (e.shiftKey && e.key !== '+') parts.push('Shift');
    parts.push(key.length === 1 ? key.toUpperCase() : key);
    post({ kind: 'key', keys: parts.join('+') });
  }, true);
})();
"#;

/// Toggles a stylesheet that makes the page ignore the pointer.
pub fn input_guard_script(enabled: bool) -> String {
    format!(
        "(function(on){{var id='__floatshell_input_guard';var s=document.getElementById(id);\
         if(on){{if(s)s.remove();}}else if(!s){{s=document.createElement('style');s.id=id;\
         s.textContent='html,body{{pointer-events:none!important}}';\
         document.documentElement.appendChild(s);}}}})({})",
        enabled
    )
}

fn page(css: &str, body: &str, js: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"UTF-8\"><style>{}{}</style></head>\
         <body>{}<script>{}</script><script>{}</script></body></html>",
        PANEL_CSS, css, body, BRIDGE_JS, js
    )
}

pub fn navbar_html() -> String {
    page(NAVBAR_CSS, NAVBAR_BODY, NAVBAR_JS)
}

pub fn overlay_html() -> String {
    page(OVERLAY_CSS, OVERLAY_BODY, OVERLAY_JS)
}
