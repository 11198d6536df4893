pub const APP_STYLES: &str = r#"
/* Layout */
#container {
    position: relative;
    min-height: 100vh;
    background: var(--window-bg, #1f2937);
    color: var(--text-primary, #f8fafc);
    font-family: system-ui, sans-serif;
    font-size: 0.875rem;
}

button {
    background: transparent;
    border: 1px solid var(--border-color, #374151);
    color: var(--text-secondary, #94a3b8);
    cursor: pointer;
    padding: 0.375rem 0.75rem;
    border-radius: 0.375rem;
}

button:disabled {
    opacity: 0.5;
    cursor: default;
}

input,
textarea {
    background: var(--input-bg, #0f172a);
    color: var(--text-primary, #f8fafc);
    border: 1px solid var(--border-color, #374151);
    border-radius: 0.375rem;
    padding: 0.5rem 0.75rem;
    box-sizing: border-box;
}

.config-error,
.listing-error,
.editor-unavailable {
    padding: 0.75rem 1rem;
    background: #7f1d1d;
    color: #fecaca;
    border-bottom: 1px solid #991b1b;
}

/* Login */
.login {
    display: flex;
    flex-direction: column;
    gap: 0.75rem;
    max-width: 320px;
    margin: 15vh auto 0;
}

.login button[type="submit"] {
    background: var(--accent-bg, #3b82f6);
    border: none;
    color: white;
}

.login-failed {
    color: #fca5a5;
    margin: 0;
}

/* File list */
.file-list-header {
    display: flex;
    align-items: center;
    justify-content: space-between;
    padding: 0.75rem 1rem;
    background: var(--titlebar-bg, #111827);
    border-bottom: 1px solid var(--border-color, #374151);
}

.breadcrumbs a {
    color: var(--accent-bg, #3b82f6);
    text-decoration: none;
    padding: 0.25rem 0.5rem;
}

.breadcrumbs .separator {
    color: var(--text-muted, #6b7280);
}

.entries {
    width: 100%;
    border-collapse: collapse;
}

.entries th {
    text-align: left;
    font-size: 0.75rem;
    color: var(--text-secondary, #94a3b8);
    border-bottom: 1px solid var(--border-color, #374151);
    padding: 0.5rem 0.75rem;
}

.entries td {
    padding: 0.5rem 0.75rem;
}

.entries a {
    color: inherit;
    text-decoration: none;
}

.entries .size,
.entries .modified {
    color: var(--text-secondary, #94a3b8);
}

.create-file {
    display: flex;
    align-items: center;
    gap: 0.5rem;
    padding: 0.75rem 1rem;
}

.create-file .validation {
    color: #fca5a5;
    margin: 0;
}

.spinner {
    display: inline-block;
    width: 0.75rem;
    height: 0.75rem;
    margin-right: 0.375rem;
    border: 2px solid currentColor;
    border-right-color: transparent;
    border-radius: 50%;
    animation: spin 0.75s linear infinite;
}

@keyframes spin {
    to { transform: rotate(360deg); }
}

/* Editor */
.file-editor {
    position: fixed;
    inset: 0;
    display: flex;
    flex-direction: column;
    background: var(--window-bg, #1f2937);
    z-index: 100;
}

.file-editor .toolbar {
    display: flex;
    align-items: center;
    gap: 0.5rem;
    padding: 0.5rem 1rem;
    background: var(--titlebar-bg, #111827);
    border-bottom: 1px solid var(--border-color, #374151);
}

.file-editor .filename {
    margin-left: auto;
    color: var(--text-secondary, #94a3b8);
}

.editor-surface,
.markdown-editor {
    flex: 1;
    display: flex;
    flex-direction: column;
    min-height: 0;
}

.code-editor,
.markdown-source {
    flex: 1;
    width: 100%;
    resize: none;
    font-family: ui-monospace, monospace;
    line-height: 1.5;
    white-space: pre-wrap;
}

.markdown-preview {
    flex: 1;
    overflow: auto;
    padding: 1rem;
}
"#;
