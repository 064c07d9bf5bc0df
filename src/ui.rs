use crate::export::{escape_html, fill_template, fmt_date_long};
use crate::history::HistoryEntry;
use crate::models::{DayRecord, MedicationSlot, Slot, TodayResponse};

pub fn render_index(today: &TodayResponse, history: &[HistoryEntry]) -> String {
    let record = &today.record;
    let schedule = &record.schedule;
    fill_template(
        INDEX_HTML,
        &[
            ("DATE", &escape_html(&fmt_date_long(&record.date))),
            ("STATUS_MODE", today.status.mode.as_str()),
            ("STATUS", &escape_html(&today.status.message)),
            ("PROG_MORNING", today.progress.morning.as_str()),
            ("PROG_EVENING", today.progress.evening.as_str()),
            ("MORNING_ON", on_class(&record.meds.morning)),
            ("EVENING_ON", on_class(&record.meds.evening)),
            ("MORNING_STATE", &escape_html(&slot_state(&record.meds.morning))),
            ("EVENING_STATE", &escape_html(&slot_state(&record.meds.evening))),
            ("MORNING_TARGET", &escape_html(schedule.morning_target.as_deref().unwrap_or_default())),
            ("EVENING_TARGET", &escape_html(schedule.evening_target.as_deref().unwrap_or_default())),
            ("REMIND_MORNING", reminder_label(record, Slot::Morning)),
            ("REMIND_EVENING", reminder_label(record, Slot::Evening)),
            ("GLUCOSE", &render_glucose(record)),
            ("HISTORY", &render_history(history)),
            ("NOTES", &escape_html(&record.notes)),
        ],
    )
}

fn on_class(slot: &MedicationSlot) -> &'static str {
    if slot.taken { "on" } else { "" }
}

pub fn slot_state(slot: &MedicationSlot) -> String {
    if slot.taken {
        format!("Taken • {}", slot.time.as_deref().unwrap_or_default())
            .trim()
            .to_string()
    } else {
        "Not taken".to_string()
    }
}

fn reminder_label(record: &DayRecord, slot: Slot) -> &'static str {
    match (slot, record.schedule.reminder(slot)) {
        (Slot::Morning, true) => "Morning reminder ON",
        (Slot::Morning, false) => "Enable morning reminder",
        (Slot::Evening, true) => "Evening reminder ON",
        (Slot::Evening, false) => "Enable evening reminder",
    }
}

fn render_glucose(record: &DayRecord) -> String {
    if record.glucose.is_empty() {
        return "No readings yet.".to_string();
    }
    record
        .glucose
        .iter()
        .rev()
        .map(|reading| {
            let tag = if reading.tag.is_empty() {
                String::new()
            } else {
                format!(r#" <span class="pill">{}</span>"#, escape_html(&reading.tag))
            };
            let note = if reading.note.is_empty() {
                String::new()
            } else {
                format!(" — {}", escape_html(&reading.note))
            };
            format!(
                "<div>• <strong>{}</strong> at {}{tag}{note}</div>",
                reading.value,
                escape_html(&reading.time)
            )
        })
        .collect()
}

fn render_history(history: &[HistoryEntry]) -> String {
    if history.is_empty() {
        return r#"<div class="empty-history">
          <div class="seed">🌱</div>
          <div class="msg">Your journey starts here.</div>
          <div class="sub">Each day you log becomes a quiet victory.</div>
        </div>"#
            .to_string();
    }
    history
        .iter()
        .map(|day| {
            format!(
                r#"<div class="day"><strong>{date}</strong><div class="muted"><span class="dot {pm}"></span><span class="dot {pe}"></span> Morning: {morning} • Evening: {evening} • Readings: {readings}</div></div>"#,
                date = escape_html(&day.date),
                pm = day.progress.morning.as_str(),
                pe = day.progress.evening.as_str(),
                morning = escape_html(&day.morning),
                evening = escape_html(&day.evening),
                readings = day.readings,
            )
        })
        .collect()
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>SteadyDay</title>
  <style>
    :root {
      --bg: #f6f7f4;
      --ink: #1f2933;
      --muted: #6b7280;
      --ok: #2d7a4b;
      --due: #b7791f;
      --late: #c63b2b;
      --card: #ffffff;
      --shadow: 0 18px 40px rgba(31, 41, 51, 0.12);
    }

    * { box-sizing: border-box; }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: system-ui, -apple-system, "Segoe UI", Roboto, Arial, sans-serif;
      display: grid;
      place-items: start center;
      padding: 28px 16px 48px;
    }

    .app { width: min(720px, 100%); display: grid; gap: 18px; }
    header { display: flex; justify-content: space-between; align-items: center; gap: 12px; flex-wrap: wrap; }
    h1 { margin: 0; font-size: 1.8rem; }
    .muted { color: var(--muted); font-size: 0.9rem; }
    .card { background: var(--card); border-radius: 18px; box-shadow: var(--shadow); padding: 18px; display: grid; gap: 12px; }

    .badge { display: inline-block; padding: 6px 12px; border-radius: 999px; font-weight: 600; font-size: 0.9rem; background: #eef2f0; }
    .badge.ok { color: var(--ok); }
    .badge.due { color: var(--due); background: #fdf3e1; }
    .badge.late { color: var(--late); background: #fbe7e4; }

    .dot { display: inline-block; width: 12px; height: 12px; border-radius: 50%; background: #d1d5db; margin-right: 4px; }
    .dot.done { background: var(--ok); }
    .dot.late { background: var(--late); }

    .meds { display: grid; grid-template-columns: repeat(2, 1fr); gap: 12px; }
    button { appearance: none; border: 1px solid #d1d5db; background: white; border-radius: 12px; padding: 12px 14px; font-size: 1rem; cursor: pointer; }
    button.on { background: var(--ok); color: white; border-color: var(--ok); }
    .tabs { display: flex; gap: 6px; }
    .tab.active { background: var(--ink); color: white; }
    .hidden { display: none; }
    .row { display: flex; gap: 8px; flex-wrap: wrap; align-items: center; }
    input, select, textarea { font: inherit; padding: 10px; border-radius: 10px; border: 1px solid #d1d5db; }
    textarea { width: 100%; min-height: 90px; }
    .pill { background: #f3f4f6; border-radius: 999px; padding: 2px 8px; font-size: 0.8rem; }
    .day { padding: 10px 0; border-bottom: 1px solid #eef0f2; }
    .empty-history { text-align: center; padding: 24px 0; }
    .empty-history .seed { font-size: 2rem; }
    .toast { position: fixed; bottom: 20px; left: 50%; transform: translateX(-50%); background: var(--ink); color: white; padding: 10px 16px; border-radius: 999px; opacity: 0; transition: opacity 200ms ease; }
    .toast.show { opacity: 1; }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <div>
        <h1>SteadyDay</h1>
        <div class="muted" id="todayDate">Today • {{DATE}}</div>
      </div>
      <div class="tabs">
        <button class="tab active" type="button" data-tab="today">Today</button>
        <button class="tab" type="button" data-tab="history">History</button>
      </div>
    </header>

    <section id="today" class="app">
      <div class="card">
        <div class="row">
          <span id="lateStatus" class="badge {{STATUS_MODE}}">{{STATUS}}</span>
          <span><span id="progMorning" class="dot {{PROG_MORNING}}"></span><span id="progEvening" class="dot {{PROG_EVENING}}"></span></span>
        </div>
        <div class="meds">
          <form method="post" action="/meds/morning/toggle" data-slot="morning">
            <button id="morningBtn" class="{{MORNING_ON}}" type="submit">Morning meds</button>
            <div class="muted" id="morningState">{{MORNING_STATE}}</div>
          </form>
          <form method="post" action="/meds/evening/toggle" data-slot="evening">
            <button id="eveningBtn" class="{{EVENING_ON}}" type="submit">Evening meds</button>
            <div class="muted" id="eveningState">{{EVENING_STATE}}</div>
          </form>
        </div>
      </div>

      <div class="card">
        <strong>Blood sugar</strong>
        <div class="row">
          <input id="glucose" type="number" min="1" step="any" placeholder="mg/dL" />
          <select id="glucoseTag">
            <option>Fasting</option>
            <option>Before meal</option>
            <option>After meal</option>
            <option>Bedtime</option>
            <option selected>Other</option>
          </select>
          <input id="glucoseNote" type="text" placeholder="Note" />
          <button id="addGlucose" type="button">Add</button>
        </div>
        <div id="glucoseList">{{GLUCOSE}}</div>
      </div>

      <div class="card">
        <strong>Schedule</strong>
        <div class="row">
          <input id="morningTime" inputmode="numeric" value="{{MORNING_TARGET}}" placeholder="08:00" />
          <input id="eveningTime" inputmode="numeric" value="{{EVENING_TARGET}}" placeholder="20:00" />
          <button id="saveSchedule" type="button">Save schedule</button>
        </div>
        <div class="row">
          <button id="remindMorning" type="button" data-slot="morning">{{REMIND_MORNING}}</button>
          <button id="remindEvening" type="button" data-slot="evening">{{REMIND_EVENING}}</button>
        </div>
      </div>

      <div class="card">
        <strong>Notes</strong>
        <textarea id="notes">{{NOTES}}</textarea>
      </div>
    </section>

    <section id="history" class="card hidden">
      <div class="row">
        <strong>Last 14 days</strong>
        <a href="/export" target="_blank" id="exportDoctor">Doctor export</a>
      </div>
      <div id="historyList">{{HISTORY}}</div>
    </section>
  </main>
  <div class="toast" id="toast"></div>

  <script>
    const $ = (id) => document.getElementById(id);
    const escapeHtml = (s) => String(s ?? '')
      .replaceAll('&', '&amp;').replaceAll('<', '&lt;').replaceAll('>', '&gt;')
      .replaceAll('"', '&quot;').replaceAll("'", '&#039;');

    const showToast = (msg) => {
      const t = $('toast');
      t.textContent = msg;
      t.classList.add('show');
      clearTimeout(t._hide);
      t._hide = setTimeout(() => t.classList.remove('show'), 1400);
    };

    const slotState = (slot) => slot.taken ? `Taken • ${slot.time || ''}`.trim() : 'Not taken';

    const render = ({ record, status, progress }) => {
      $('lateStatus').textContent = status.message;
      $('lateStatus').className = `badge ${status.mode}`;
      $('progMorning').className = `dot ${progress.morning}`;
      $('progEvening').className = `dot ${progress.evening}`;
      $('morningBtn').classList.toggle('on', record.meds.morning.taken);
      $('eveningBtn').classList.toggle('on', record.meds.evening.taken);
      $('morningState').textContent = slotState(record.meds.morning);
      $('eveningState').textContent = slotState(record.meds.evening);
      const list = record.glucose.slice().reverse();
      $('glucoseList').innerHTML = list.length
        ? list.map((g) => {
            const tag = g.tag ? ` <span class="pill">${escapeHtml(g.tag)}</span>` : '';
            const note = g.note ? ` — ${escapeHtml(g.note)}` : '';
            return `<div>• <strong>${g.value}</strong> at ${escapeHtml(g.time)}${tag}${note}</div>`;
          }).join('')
        : 'No readings yet.';
      $('remindMorning').textContent = record.schedule.remindMorning ? 'Morning reminder ON' : 'Enable morning reminder';
      $('remindEvening').textContent = record.schedule.remindEvening ? 'Evening reminder ON' : 'Enable evening reminder';
      const rtl = /[؀-ۿ]/.test($('notes').value);
      $('notes').style.direction = rtl ? 'rtl' : 'ltr';
    };

    const call = async (method, url, body) => {
      const res = await fetch(url, {
        method,
        headers: body ? { 'content-type': 'application/json' } : {},
        body: body ? JSON.stringify(body) : undefined
      });
      if (!res.ok) {
        throw new Error((await res.text()) || 'Request failed');
      }
      return res.json();
    };

    const renderHistory = ({ days }) => {
      $('historyList').innerHTML = days.length
        ? days.map((d) => `<div class="day"><strong>${escapeHtml(d.date)}</strong><div class="muted">`
            + `<span class="dot ${d.progress.morning}"></span><span class="dot ${d.progress.evening}"></span>`
            + ` Morning: ${escapeHtml(d.morning)} • Evening: ${escapeHtml(d.evening)} • Readings: ${d.readings}</div></div>`).join('')
        : `<div class="empty-history">
          <div class="seed">🌱</div>
          <div class="msg">Your journey starts here.</div>
          <div class="sub">Each day you log becomes a quiet victory.</div>
        </div>`;
    };

    const fail = (err) => alert(err.message);
    const refreshHistory = () => call('GET', '/api/history').then(renderHistory).catch(fail);
    const refresh = () => call('GET', '/api/today').then(render).then(refreshHistory).catch(fail);

    document.querySelectorAll('form[data-slot]').forEach((form) => {
      form.addEventListener('submit', (event) => {
        event.preventDefault();
        call('POST', `/api/meds/${form.dataset.slot}/toggle`).then(render).then(refreshHistory).catch(fail);
      });
    });

    $('addGlucose').addEventListener('click', () => {
      const value = Number($('glucose').value);
      if (!value || value <= 0) return;
      call('POST', '/api/glucose', { value, tag: $('glucoseTag').value, note: $('glucoseNote').value })
        .then((today) => {
          $('glucose').value = '';
          $('glucoseNote').value = '';
          render(today);
          return refreshHistory();
        })
        .catch(fail);
    });

    ['morningTime', 'eveningTime'].forEach((id) => {
      const input = $(id);
      input.addEventListener('input', () => {
        let v = input.value.replace(/\D/g, '').slice(0, 4);
        if (v.length >= 3) v = v.slice(0, 2) + ':' + v.slice(2);
        input.value = v;
      });
    });

    $('saveSchedule').addEventListener('click', () => {
      call('PUT', '/api/schedule', { morningTarget: $('morningTime').value, eveningTarget: $('eveningTime').value })
        .then((today) => {
          $('morningTime').value = today.record.schedule.morningTarget || '';
          $('eveningTime').value = today.record.schedule.eveningTarget || '';
          render(today);
          showToast('Schedule saved ✓');
        })
        .catch(fail);
    });

    ['remindMorning', 'remindEvening'].forEach((id) => {
      $(id).addEventListener('click', () => {
        call('POST', `/api/reminders/${$(id).dataset.slot}/toggle`).then(refresh).catch(fail);
      });
    });

    // One save in flight at a time, sent in typing order.
    let notesQueue = Promise.resolve();
    let notesTimer;
    $('notes').addEventListener('input', () => {
      clearTimeout(notesTimer);
      notesTimer = setTimeout(() => {
        const notes = $('notes').value;
        notesQueue = notesQueue.then(() => call('PUT', '/api/notes', { notes })).catch(fail);
      }, 300);
    });

    document.querySelectorAll('.tab').forEach((btn) => {
      btn.addEventListener('click', () => {
        const tab = btn.dataset.tab;
        $('today').classList.toggle('hidden', tab !== 'today');
        $('history').classList.toggle('hidden', tab !== 'history');
        document.querySelectorAll('.tab').forEach((b) => b.classList.toggle('active', b === btn));
        if (tab === 'history') refreshHistory();
      });
    });

    setInterval(refresh, 30000);
  </script>
</body>
</html>
"#;
