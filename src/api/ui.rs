//! Embedded single-page UI.
//!
//! Kept as a `&'static str` so the page ships inside the binary.

pub const INDEX_HTML: &str = r##"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Spatial LLM Agent</title>
  <style>
    body { font-family: system-ui, sans-serif; max-width: 960px; margin: 2rem auto; padding: 0 1rem; color: #1f2328; }
    h1 { font-size: 1.6rem; }
    label { display: block; margin: 0.8rem 0 0.3rem; font-weight: 600; }
    textarea { width: 100%; min-height: 5rem; font: inherit; }
    button { margin-top: 0.8rem; padding: 0.5rem 1.2rem; font: inherit; cursor: pointer; }
    button:disabled { cursor: progress; opacity: 0.6; }
    .note { padding: 0.6rem 0.8rem; border-radius: 6px; margin: 0.8rem 0; }
    .warn { background: #fff8c5; }
    .ok { background: #dafbe1; }
    .err { background: #ffebe9; }
    pre { background: #f6f8fa; padding: 0.8rem; overflow-x: auto; white-space: pre-wrap; }
    table { border-collapse: collapse; width: 100%; margin-bottom: 1.5rem; font-size: 0.9rem; }
    th, td { border: 1px solid #d0d7de; padding: 0.3rem 0.5rem; text-align: left; }
    th { background: #f6f8fa; }
    details { margin: 1rem 0; }
  </style>
</head>
<body>
  <h1>Chain-of-Thought Spatial Analysis with LLM</h1>
  <p>Use natural language to perform spatial operations (buffering, intersecting, summarizing layers) with an LLM-powered agent.</p>

  <label for="school_zones">Upload School Zones GeoJSON</label>
  <input type="file" id="school_zones" accept=".geojson,.json">
  <label for="flood_zones">Upload Flood Zones GeoJSON</label>
  <input type="file" id="flood_zones" accept=".geojson,.json">

  <div id="status" class="note warn">Please upload both GeoJSON layers to proceed.</div>

  <div id="query-panel" hidden>
    <label for="query">Enter your spatial query:</label>
    <textarea id="query">Given school_zones and flood_zones layers, find which schools lie in flood zones and summarize them.</textarea>
    <button id="run">Run Query</button>
  </div>

  <div id="output"></div>

  <script>
    const $ = (id) => document.getElementById(id);
    let sessionId = null;

    async function request(path, options) {
      const res = await fetch(path, options);
      const body = await res.json().catch(() => ({}));
      if (!res.ok) throw new Error(body.error || res.statusText);
      return body;
    }

    function setStatus(kind, text) {
      const el = $("status");
      el.className = "note " + kind;
      el.textContent = text;
    }

    function renderTable(table) {
      const wrap = document.createElement("div");
      const title = document.createElement("h3");
      title.textContent = table.name + " (" + table.rows.length + " features)";
      const link = document.createElement("a");
      link.href = "/api/sessions/" + sessionId + "/layers/" + encodeURIComponent(table.name) + "/geojson";
      link.textContent = " download";
      title.appendChild(link);
      wrap.appendChild(title);

      const el = document.createElement("table");
      const head = el.insertRow();
      table.columns.forEach((c) => {
        const th = document.createElement("th");
        th.textContent = c;
        head.appendChild(th);
      });
      table.rows.forEach((row) => {
        const tr = el.insertRow();
        row.forEach((v) => {
          tr.insertCell().textContent = v === null ? "" : (typeof v === "object" ? JSON.stringify(v) : v);
        });
      });
      wrap.appendChild(el);
      return wrap;
    }

    async function upload() {
      const school = $("school_zones").files[0];
      const flood = $("flood_zones").files[0];
      if (!school || !flood) {
        $("query-panel").hidden = true;
        setStatus("warn", "Please upload both GeoJSON layers to proceed.");
        return;
      }
      const form = new FormData();
      form.append("school_zones", school);
      form.append("flood_zones", flood);
      try {
        const layers = await request("/api/sessions/" + sessionId + "/layers", { method: "POST", body: form });
        setStatus("ok", "Loaded " + layers.map((l) => l.name + " (" + l.feature_count + " features)").join(", "));
        $("query-panel").hidden = false;
      } catch (e) {
        $("query-panel").hidden = true;
        setStatus("err", "Error: " + e.message);
      }
    }

    async function run() {
      const out = $("output");
      out.innerHTML = "";
      $("run").disabled = true;
      setStatus("warn", "Thinking...");
      try {
        const result = await request("/api/sessions/" + sessionId + "/query", {
          method: "POST",
          headers: { "Content-Type": "application/json" },
          body: JSON.stringify({ query: $("query").value }),
        });
        setStatus("ok", "Query complete!");

        const heading = document.createElement("p");
        heading.innerHTML = "<strong>LLM Output:</strong>";
        out.appendChild(heading);
        const answer = document.createElement("pre");
        answer.textContent = result.answer;
        out.appendChild(answer);

        const trace = document.createElement("details");
        trace.innerHTML = "<summary>Tool trace (" + result.iterations + " model calls)</summary>";
        const log = document.createElement("pre");
        log.textContent = result.log.map((e) => "[" + e.entry_type + "] " + e.content).join("\n\n");
        trace.appendChild(log);
        out.appendChild(trace);

        result.tables.forEach((t) => out.appendChild(renderTable(t)));
      } catch (e) {
        setStatus("err", e.message);
      } finally {
        $("run").disabled = false;
      }
    }

    (async () => {
      try {
        sessionId = (await request("/api/sessions", { method: "POST" })).id;
      } catch (e) {
        setStatus("err", "Could not start a session: " + e.message);
        return;
      }
      $("school_zones").addEventListener("change", upload);
      $("flood_zones").addEventListener("change", upload);
      $("run").addEventListener("click", run);
    })();
  </script>
</body>
</html>
"##;
