use axum::response::Html;

/// Single-page chat and upload UI served at `/`. Talks to the JSON routes
/// under `/api/v1`.
pub async fn index_page() -> Html<&'static str> {
    Html(INDEX_HTML)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Knowledge Base</title>
  <style>
    body { font-family: system-ui, sans-serif; max-width: 48rem; margin: 2rem auto; padding: 0 1rem; color: #1f2937; }
    h1 { text-align: center; }
    #log { border: 1px solid #d1d5db; border-radius: 6px; padding: 1rem; min-height: 16rem; margin-bottom: 1rem; white-space: pre-wrap; }
    .q { font-weight: 600; margin-top: 0.75rem; }
    .a { margin: 0.25rem 0 0.75rem; }
    .err { color: #b91c1c; }
    form { display: flex; gap: 0.5rem; margin-bottom: 2rem; }
    input[type=text] { flex: 1; padding: 0.5rem; }
    fieldset { border: 1px solid #d1d5db; border-radius: 6px; }
    #upload-status { margin-top: 0.5rem; }
  </style>
</head>
<body>
  <h1>Knowledge Base</h1>

  <div id="log"></div>
  <form id="chat-form">
    <input type="text" id="message" placeholder="Ask a question..." autocomplete="off">
    <button type="submit">Send</button>
  </form>

  <fieldset>
    <legend>Upload knowledge</legend>
    <p>Uploaded documents are chunked, embedded, and added to the vector index.</p>
    <form id="upload-form">
      <input type="file" id="files" multiple>
      <button type="submit">Ingest</button>
    </form>
    <div id="upload-status"></div>
  </fieldset>

  <script>
    const log = document.getElementById('log');
    const append = (cls, text) => {
      const div = document.createElement('div');
      div.className = cls;
      div.textContent = text;
      log.appendChild(div);
      log.scrollTop = log.scrollHeight;
    };

    document.getElementById('chat-form').addEventListener('submit', async (e) => {
      e.preventDefault();
      const input = document.getElementById('message');
      const message = input.value;
      input.value = '';
      append('q', 'Q: ' + message);
      const res = await fetch('/api/v1/chat', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ message }),
      });
      const body = await res.json();
      if (res.ok) {
        append('a', 'A: ' + body.answer);
      } else {
        append('err', body.error);
      }
    });

    document.getElementById('upload-form').addEventListener('submit', async (e) => {
      e.preventDefault();
      const status = document.getElementById('upload-status');
      const data = new FormData();
      for (const file of document.getElementById('files').files) {
        data.append('files', file);
      }
      status.textContent = 'Ingesting...';
      const res = await fetch('/api/v1/ingest', { method: 'POST', body: data });
      const body = await res.json();
      status.textContent = res.ok ? body.status : body.error;
    });
  </script>
</body>
</html>
"#;
