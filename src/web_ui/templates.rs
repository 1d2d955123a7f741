//! Template engine setup and HTML templates.

use once_cell::sync::Lazy;
use tera::{Context, Tera};

/// Global template engine instance with embedded templates.
pub static TEMPLATES: Lazy<Tera> = Lazy::new(|| {
    let mut tera = Tera::default();

    // Embed templates directly in the binary (no external files needed)
    tera.add_raw_templates(vec![
        ("base.html", BASE_TEMPLATE),
        ("access.html", ACCESS_TEMPLATE),
        ("viewer.html", VIEWER_TEMPLATE),
        ("admin_login.html", ADMIN_LOGIN_TEMPLATE),
        ("admin.html", ADMIN_TEMPLATE),
        ("tokens.html", TOKENS_TEMPLATE),
        ("error.html", ERROR_TEMPLATE),
    ])
    .expect("Failed to load templates");

    tera
});

/// Render a template with context
pub fn render(template: &str, context: &Context) -> Result<String, tera::Error> {
    TEMPLATES.render(template, context)
}

// =============================================================================
// Embedded Templates
// =============================================================================

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{% block title %}360° Photo Access{% endblock %}</title>
    <style>
        :root {
            --bg: #0a0a0a;
            --bg-secondary: #141414;
            --foreground: #fafafa;
            --foreground-secondary: rgba(250, 250, 250, 0.7);
            --foreground-tertiary: rgba(250, 250, 250, 0.4);
            --border: #262626;
            --border-subtle: #1a1a1a;
            --accent: #fafafa;
        }

        * { box-sizing: border-box; margin: 0; padding: 0; }

        body {
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Helvetica, Arial, sans-serif;
            background: var(--bg);
            color: var(--foreground);
            line-height: 1.6;
            -webkit-font-smoothing: antialiased;
        }

        a {
            color: var(--foreground);
            text-decoration: none;
            transition: opacity 0.15s;
        }
        a:hover { opacity: 0.7; }

        /* Header */
        .header {
            border-bottom: 1px solid var(--border-subtle);
            padding: 20px 32px;
        }
        .header-content {
            max-width: 1100px;
            margin: 0 auto;
            display: flex;
            align-items: center;
            justify-content: space-between;
        }
        .logo {
            font-size: 18px;
            font-weight: 600;
            letter-spacing: -0.02em;
            color: var(--foreground);
        }
        .nav {
            display: flex;
            gap: 32px;
        }
        .nav a {
            color: var(--foreground-secondary);
            font-size: 14px;
        }
        .nav a:hover {
            color: var(--foreground);
            opacity: 1;
        }

        /* Layout */
        .container {
            max-width: 1100px;
            margin: 0 auto;
            padding: 48px 32px;
        }

        /* Typography */
        h1 {
            font-size: 32px;
            font-weight: 600;
            letter-spacing: -0.02em;
            margin-bottom: 32px;
        }
        h2 {
            font-size: 14px;
            font-weight: 500;
            color: var(--foreground-secondary);
            text-transform: uppercase;
            letter-spacing: 0.05em;
            margin-bottom: 16px;
        }

        /* Cards */
        .card {
            background: var(--bg-secondary);
            border: 1px solid var(--border);
            border-radius: 16px;
            overflow: hidden;
        }
        .card + .card {
            margin-top: 24px;
        }

        /* Forms */
        .form-input {
            width: 100%;
            padding: 12px 16px;
            background: var(--bg);
            border: 1px solid var(--border);
            border-radius: 8px;
            color: var(--foreground);
            font-size: 14px;
            margin-bottom: 16px;
        }
        .form-input:focus {
            outline: none;
            border-color: var(--foreground-tertiary);
        }
        .form-label {
            display: block;
            font-size: 13px;
            color: var(--foreground-secondary);
            margin-bottom: 8px;
        }

        /* Buttons */
        .btn {
            display: inline-flex;
            align-items: center;
            gap: 8px;
            padding: 10px 20px;
            border-radius: 100px;
            font-size: 14px;
            font-weight: 500;
            transition: all 0.15s;
            border: none;
            cursor: pointer;
        }
        .btn-primary {
            background: var(--foreground);
            color: var(--bg);
        }
        .btn-primary:hover {
            opacity: 0.9;
        }
        .btn-secondary {
            background: transparent;
            border: 1px solid var(--border);
            color: var(--foreground);
        }
        .btn-secondary:hover {
            background: var(--bg-secondary);
            border-color: var(--foreground-tertiary);
        }

        /* Alerts */
        .alert {
            padding: 12px 16px;
            border-radius: 8px;
            font-size: 14px;
            margin-bottom: 24px;
        }
        .alert-error {
            background: rgba(239, 68, 68, 0.12);
            border: 1px solid rgba(239, 68, 68, 0.4);
            color: #f87171;
        }
        .alert-success {
            background: rgba(34, 197, 94, 0.12);
            border: 1px solid rgba(34, 197, 94, 0.4);
            color: #4ade80;
        }
        .alert-warning {
            background: rgba(234, 179, 8, 0.12);
            border: 1px solid rgba(234, 179, 8, 0.4);
            color: #facc15;
        }

        /* Code */
        code {
            font-family: 'SF Mono', 'Consolas', 'Liberation Mono', Menlo, monospace;
            font-size: 13px;
            background: var(--bg);
            border: 1px solid var(--border);
            padding: 12px 16px;
            border-radius: 8px;
            display: block;
            color: var(--foreground-secondary);
        }

        /* Tables */
        .table {
            width: 100%;
            border-collapse: collapse;
            font-size: 14px;
        }
        .table th {
            text-align: left;
            padding: 12px 20px;
            color: var(--foreground-secondary);
            font-weight: 500;
            border-bottom: 1px solid var(--border-subtle);
        }
        .table td {
            padding: 12px 20px;
            border-bottom: 1px solid var(--border-subtle);
            font-family: 'SF Mono', 'Consolas', 'Liberation Mono', Menlo, monospace;
            font-size: 13px;
            color: var(--foreground-secondary);
        }
        .table tr:last-child td { border-bottom: none; }

        /* Badges */
        .badge {
            font-size: 11px;
            font-weight: 500;
            padding: 4px 10px;
            border-radius: 100px;
            background: var(--border);
            color: var(--foreground-secondary);
            text-transform: uppercase;
            letter-spacing: 0.02em;
        }

        /* Panorama container */
        .panorama {
            width: 100%;
            height: 420px;
        }
        .panorama + h2 { margin-top: 32px; }

        /* Section headers */
        .section-header {
            padding: 16px 20px;
            border-bottom: 1px solid var(--border-subtle);
            display: flex;
            align-items: center;
            justify-content: space-between;
        }
        .section-title {
            font-size: 13px;
            font-weight: 500;
            color: var(--foreground-secondary);
        }

        /* Empty state */
        .empty {
            text-align: center;
            padding: 64px 32px;
            color: var(--foreground-tertiary);
        }

        /* Utility */
        .text-secondary { color: var(--foreground-secondary); }
        .text-tertiary { color: var(--foreground-tertiary); }
        .text-sm { font-size: 13px; }
        .mt-2 { margin-top: 8px; }
        .mt-4 { margin-top: 16px; }
        .mt-6 { margin-top: 24px; }
        .mb-4 { margin-bottom: 16px; }

        /* Mobile */
        @media (max-width: 768px) {
            .header { padding: 16px 20px; }
            .container { padding: 32px 20px; }
            h1 { font-size: 24px; }
            .nav { gap: 20px; }
        }
    </style>
    {% block head %}{% endblock %}
</head>
<body>
    <header class="header">
        <div class="header-content">
            <a href="/" class="logo">360° Photo Access</a>
            <nav class="nav">
                <a href="/">Viewer</a>
                <a href="/admin">Admin</a>
            </nav>
        </div>
    </header>
    <main class="container">
        {% block content %}{% endblock %}
    </main>
</body>
</html>"##;

const ACCESS_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block title %}360° Photo Access{% endblock %}
{% block content %}
<h1>360° Photo Access</h1>

{% if error %}<div class="alert alert-error">{{ error }}</div>{% endif %}
{% if message %}<div class="alert alert-success">{{ message }}</div>{% endif %}

<div class="card">
    <form method="POST" action="/access" style="padding: 24px; max-width: 420px;">
        <label class="form-label" for="access_code">Enter Password</label>
        <input class="form-input" type="password" id="access_code" name="access_code" autofocus>
        <button type="submit" class="btn btn-primary">Submit</button>
    </form>
</div>
{% endblock %}"##;

const VIEWER_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block title %}360° Photo Viewer{% endblock %}
{% block head %}
<link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/pannellum@2.5.6/build/pannellum.css">
<script src="https://cdn.jsdelivr.net/npm/pannellum@2.5.6/build/pannellum.js"></script>
{% endblock %}
{% block content %}
<h1>Multi-File 360° Photo Viewer</h1>

{% if warning %}<div class="alert alert-warning">{{ warning }}</div>{% endif %}

<div class="card">
    <form method="POST" action="/viewer" enctype="multipart/form-data" style="padding: 24px;">
        <p class="text-secondary mb-4">Upload up to 3 images (jpg, jpeg, png)</p>
        <input class="form-input" type="file" name="images" accept=".jpg,.jpeg,.png" multiple>
        <button type="submit" class="btn btn-primary">Display</button>
    </form>
</div>

{% for scene in scenes %}
<h2 class="mt-6">{{ scene.title }}</h2>
<div id="{{ scene.id }}" class="panorama card"></div>
{% endfor %}

{% if scenes %}
<script>
{% for scene in scenes %}
pannellum.viewer("{{ scene.id }}", {
    "type": "equirectangular",
    "panorama": "{{ scene.data_url | safe }}",
    "autoLoad": true,
    "title": "{{ scene.title }}"
});
{% endfor %}
</script>
{% endif %}
{% endblock %}"##;

const ADMIN_LOGIN_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block title %}Admin Login{% endblock %}
{% block content %}
<h1>Admin Login</h1>

{% if error %}<div class="alert alert-error">{{ error }}</div>{% endif %}

<div class="card">
    <form method="POST" action="/admin/login" style="padding: 24px; max-width: 420px;">
        <label class="form-label" for="password">Enter Admin Password</label>
        <input class="form-input" type="password" id="password" name="password" autofocus>
        <button type="submit" class="btn btn-primary">Login</button>
    </form>
</div>
{% endblock %}"##;

const ADMIN_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block title %}Token Generator{% endblock %}
{% block content %}
<h1>Token Generator</h1>

{% if error %}<div class="alert alert-error">{{ error }}</div>{% endif %}
{% if success %}<div class="alert alert-success">{{ success }}</div>{% endif %}

{% if new_token %}
<div class="card">
    <div style="padding: 24px;">
        <p class="text-secondary mb-4">Token generated.</p>
        <code>{{ new_token }}</code>
        <p class="text-tertiary text-sm mt-2">Expires on: {{ expires }}</p>
    </div>
</div>
{% endif %}

<h2 class="mt-6">Generate</h2>
<div class="card">
    <form method="POST" action="/admin/tokens" style="padding: 24px; max-width: 420px;">
        <label class="form-label" for="days">Token Validity (days)</label>
        <input class="form-input" type="number" id="days" name="days" min="1" max="30" step="1" value="7">
        <button type="submit" class="btn btn-primary">Generate Token</button>
    </form>
</div>

<h2 class="mt-6">Maintenance</h2>
<div class="card">
    <div style="padding: 24px; display: flex; gap: 12px; align-items: center;">
        <form method="POST" action="/admin/tokens/sweep">
            <button type="submit" class="btn btn-secondary">Clear Expired Tokens</button>
        </form>
        <a href="/admin/tokens" class="btn btn-secondary">Display All Tokens</a>
    </div>
</div>
{% endblock %}"##;

const TOKENS_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block title %}All Tokens{% endblock %}
{% block content %}
<h1>All Tokens</h1>

<div class="card">
    <div class="section-header">
        <span class="section-title">Sheet data</span>
        <span class="badge">{{ records | length }}</span>
    </div>
    {% if records %}
    <table class="table">
        <tr><th>Token</th><th>Expiration_Date</th></tr>
        {% for record in records %}
        <tr><td>{{ record.token }}</td><td>{{ record.expiration }}</td></tr>
        {% endfor %}
    </table>
    {% else %}
    <div class="empty">
        <p>No tokens stored</p>
    </div>
    {% endif %}
</div>

<a href="/admin" class="btn btn-secondary mt-6" style="margin-top: 24px;">Back to Token Generator</a>
{% endblock %}"##;

const ERROR_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block title %}Error{% endblock %}
{% block content %}
<div class="card">
    <div style="padding: 48px; text-align: center;">
        <h1 style="margin-bottom: 16px;">Something went wrong</h1>
        <p class="text-secondary">{{ message }}</p>
        <a href="/" class="btn btn-secondary mt-6">Return home</a>
    </div>
</div>
{% endblock %}"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_templates_render() {
        let mut context = Context::new();
        context.insert("message", "boom");
        context.insert("records", &Vec::<crate::store::TokenRecord>::new());
        context.insert("scenes", &Vec::<crate::panorama::Scene>::new());

        for name in [
            "access.html",
            "viewer.html",
            "admin_login.html",
            "admin.html",
            "tokens.html",
            "error.html",
        ] {
            render(name, &context).unwrap_or_else(|e| panic!("{name}: {e}"));
        }
    }
}
