use crate::auth::User;

pub fn render_sign_in() -> String {
    page("Fitness Tracker", SIGN_IN_BODY)
}

pub fn render_app(user: &User) -> String {
    let email = user.email.as_deref().unwrap_or("athlete");
    page(
        "Fitness Tracker",
        &APP_BODY.replace("{{EMAIL}}", &escape_html(email)),
    )
}

fn page(title: &str, body: &str) -> String {
    LAYOUT_HTML
        .replace("{{TITLE}}", &escape_html(title))
        .replace("{{BODY}}", body)
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const LAYOUT_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #eef6f1;
      --bg-2: #bfe3d0;
      --ink: #23302b;
      --accent: #ff6b4a;
      --accent-2: #2f5d50;
      --steps: #3b82f6;
      --calories: #f97316;
      --workouts: #10b981;
      --card: rgba(255, 255, 255, 0.88);
      --shadow: 0 24px 60px rgba(47, 93, 80, 0.16);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #e2f2ea 60%, #f4faf7 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      padding: 32px 18px 48px;
    }

    h1, h2 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      margin: 0;
    }

    .subtitle {
      margin: 0;
      color: #5f6b66;
    }

    .shell {
      width: min(1100px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 24px;
    }

    .topbar {
      display: flex;
      align-items: center;
      justify-content: space-between;
      gap: 16px;
    }

    .grid {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(320px, 1fr));
      gap: 24px;
    }

    .card {
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 24px;
      box-shadow: var(--shadow);
      padding: 28px;
      display: grid;
      gap: 18px;
      align-content: start;
    }

    .card header {
      display: flex;
      align-items: center;
      justify-content: space-between;
      gap: 12px;
    }

    .gate {
      width: min(460px, 100%);
      margin: 8vh auto 0;
      text-align: center;
    }

    form {
      display: grid;
      gap: 12px;
    }

    .row {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(120px, 1fr));
      gap: 12px;
    }

    label {
      display: grid;
      gap: 6px;
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.08em;
      color: #7b857f;
      text-align: left;
    }

    input, select, textarea {
      font: inherit;
      padding: 10px 12px;
      border-radius: 12px;
      border: 1px solid rgba(47, 93, 80, 0.2);
      background: white;
      color: var(--ink);
      text-transform: none;
      letter-spacing: normal;
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 12px 18px;
      font: inherit;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent-2);
      color: white;
      transition: transform 150ms ease;
    }

    button:active {
      transform: scale(0.98);
    }

    button.ghost {
      background: rgba(47, 93, 80, 0.08);
      color: var(--accent-2);
    }

    button.danger {
      background: transparent;
      color: #c2410c;
      padding: 6px 10px;
    }

    .hidden {
      display: none !important;
    }

    .status {
      min-height: 1.2em;
      font-size: 0.9rem;
      color: #5f6b66;
    }

    .status[data-type="error"] {
      color: #c2410c;
    }

    .status[data-type="ok"] {
      color: #15803d;
    }

    .stat-pair {
      display: grid;
      grid-template-columns: 1fr 1fr;
      gap: 12px;
    }

    .stat {
      background: white;
      border-radius: 18px;
      padding: 16px;
      border: 1px solid rgba(47, 93, 80, 0.08);
    }

    .stat .label {
      display: block;
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #8b958f;
    }

    .stat .value {
      display: block;
      font-size: 1.6rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    ul.list {
      list-style: none;
      margin: 0;
      padding: 0;
      display: grid;
      gap: 10px;
    }

    ul.list li {
      background: white;
      border-radius: 16px;
      padding: 14px 16px;
      border: 1px solid rgba(47, 93, 80, 0.08);
      display: grid;
      gap: 8px;
    }

    .item-head {
      display: flex;
      justify-content: space-between;
      align-items: center;
      gap: 8px;
    }

    .muted {
      color: #7b857f;
      font-size: 0.9rem;
    }

    .progress-track {
      height: 10px;
      border-radius: 999px;
      background: rgba(47, 93, 80, 0.1);
      overflow: hidden;
    }

    .progress-fill {
      height: 100%;
      background: var(--workouts);
    }

    .inline {
      display: flex;
      gap: 8px;
      align-items: center;
    }

    .inline input {
      width: 120px;
    }

    .tabs {
      display: flex;
      gap: 6px;
      padding: 6px;
      background: rgba(47, 93, 80, 0.08);
      border-radius: 999px;
    }

    .tab {
      background: transparent;
      color: #5f6b66;
      padding: 8px 14px;
    }

    .tab.active {
      background: white;
      color: var(--accent-2);
      box-shadow: 0 8px 16px rgba(47, 93, 80, 0.12);
    }

    .chart {
      height: 220px;
      display: flex;
      align-items: flex-end;
      gap: 10px;
    }

    .bar-col {
      flex: 1;
      display: flex;
      flex-direction: column;
      align-items: center;
      gap: 6px;
      height: 100%;
      justify-content: flex-end;
    }

    .bar {
      width: 100%;
      border-radius: 10px 10px 0 0;
      transition: height 300ms ease;
    }

    .bar-label {
      font-size: 0.75rem;
      color: #7b857f;
      white-space: nowrap;
    }

    .bar[data-metric="steps"] { background: var(--steps); }
    .bar[data-metric="calories"] { background: var(--calories); }
    .bar[data-metric="workouts"] { background: var(--workouts); }
  </style>
</head>
<body>
{{BODY}}
</body>
</html>
"#;

const SIGN_IN_BODY: &str = r#"  <main class="card gate">
    <h1>Fitness Tracker</h1>
    <p class="subtitle">Track your workouts, monitor your progress, and achieve your fitness goals.</p>
    <form id="auth-form">
      <label>Email <input type="email" name="email" autocomplete="email" required /></label>
      <label>Password <input type="password" name="password" autocomplete="current-password" minlength="6" required /></label>
      <button type="submit" id="auth-submit">Sign In</button>
      <button type="button" class="ghost" id="auth-toggle">Need an account? Sign up</button>
    </form>
    <div class="status" id="status" role="status" aria-live="polite"></div>
  </main>
  <script>
    const form = document.getElementById('auth-form');
    const submitEl = document.getElementById('auth-submit');
    const toggleEl = document.getElementById('auth-toggle');
    const statusEl = document.getElementById('status');
    let mode = 'sign-in';

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    toggleEl.addEventListener('click', () => {
      mode = mode === 'sign-in' ? 'sign-up' : 'sign-in';
      submitEl.textContent = mode === 'sign-in' ? 'Sign In' : 'Sign Up';
      toggleEl.textContent = mode === 'sign-in' ? 'Need an account? Sign up' : 'Have an account? Sign in';
      setStatus('', '');
    });

    form.addEventListener('submit', async (event) => {
      event.preventDefault();
      const data = new FormData(form);
      setStatus('Working...', 'info');
      try {
        const res = await fetch(`/api/auth/${mode}`, {
          method: 'POST',
          headers: { 'content-type': 'application/json' },
          body: JSON.stringify({ email: data.get('email'), password: data.get('password') })
        });
        if (!res.ok) {
          throw new Error((await res.text()) || 'Request failed');
        }
        const body = await res.json();
        if (body.signed_in) {
          window.location.reload();
        } else {
          setStatus(body.notice || 'Account created.', 'ok');
        }
      } catch (err) {
        setStatus(err.message, 'error');
      }
    });
  </script>"#;

const APP_BODY: &str = r#"  <div class="shell">
    <header class="topbar">
      <div>
        <h1>Fitness Tracker</h1>
        <p class="subtitle">Signed in as {{EMAIL}}</p>
      </div>
      <button class="ghost" id="sign-out">Sign Out</button>
    </header>
    <div class="status" id="status" role="status" aria-live="polite"></div>

    <div class="grid">
      <section class="card" id="daily-stats">
        <header>
          <h2>Today's Stats</h2>
          <button class="ghost" id="stats-edit">Update</button>
        </header>
        <div class="stat-pair">
          <div class="stat"><span class="label">Steps</span><span class="value" id="stats-steps">0</span></div>
          <div class="stat"><span class="label">Calories</span><span class="value" id="stats-calories">0</span></div>
        </div>
        <form id="stats-form" class="hidden">
          <div class="row">
            <label>Steps <input type="number" name="steps" min="0" required /></label>
            <label>Calories <input type="number" name="calories_burned" min="0" required /></label>
          </div>
          <div class="inline">
            <button type="submit">Save</button>
            <button type="button" class="ghost" id="stats-cancel">Cancel</button>
          </div>
        </form>
      </section>

      <section class="card" id="goals">
        <header>
          <h2>Goals</h2>
          <button class="ghost" id="goal-new">New Goal</button>
        </header>
        <form id="goal-form" class="hidden">
          <div class="row">
            <label>Type
              <select name="goal_type">
                <option value="steps">Steps</option>
                <option value="calories">Calories</option>
                <option value="workouts">Workouts</option>
              </select>
            </label>
            <label>Target <input type="number" name="target_value" min="1" required /></label>
            <label>Timeframe
              <select name="timeframe">
                <option value="daily">Daily</option>
                <option value="weekly">Weekly</option>
                <option value="monthly">Monthly</option>
              </select>
            </label>
          </div>
          <div class="inline">
            <button type="submit" id="goal-submit">Create</button>
            <button type="button" class="ghost" id="goal-cancel">Cancel</button>
          </div>
        </form>
        <ul class="list" id="goal-list"></ul>
      </section>
    </div>

    <section class="card" id="progress">
      <header>
        <div>
          <h2>Last 7 Days</h2>
          <p class="subtitle" id="progress-summary">Loading...</p>
        </div>
        <div class="tabs" role="tablist">
          <button class="tab active" data-metric="steps" role="tab" aria-selected="true">Steps</button>
          <button class="tab" data-metric="calories" role="tab" aria-selected="false">Calories</button>
          <button class="tab" data-metric="workouts" role="tab" aria-selected="false">Workouts</button>
        </div>
      </header>
      <div class="chart" id="chart"></div>
    </section>

    <section class="card" id="workouts">
      <header>
        <h2>Workout Log</h2>
        <button class="ghost" id="workout-new">Log Workout</button>
      </header>
      <form id="workout-form" class="hidden">
        <label>Name <input type="text" name="name" required /></label>
        <div class="row">
          <label>Duration (min) <input type="number" name="duration_minutes" min="1" required /></label>
          <label>Calories <input type="number" name="calories_burned" min="0" required /></label>
          <label>Date <input type="date" name="date" required /></label>
        </div>
        <label>Notes <textarea name="notes" rows="2"></textarea></label>
        <div class="inline">
          <button type="submit">Save Workout</button>
          <button type="button" class="ghost" id="workout-cancel">Cancel</button>
        </div>
      </form>
      <ul class="list" id="workout-list"></ul>
    </section>
  </div>

  <script>
    const statusEl = document.getElementById('status');
    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };
    const report = (err) => setStatus(err.message, 'error');
    const escapeHtml = (value) => String(value)
      .replace(/&/g, '&amp;')
      .replace(/</g, '&lt;')
      .replace(/>/g, '&gt;')
      .replace(/"/g, '&quot;');

    const api = async (path, options = {}) => {
      const res = await fetch(path, {
        ...options,
        headers: options.body ? { 'content-type': 'application/json' } : undefined
      });
      if (!res.ok) {
        const message = (await res.text()) || 'Request failed';
        // reload only when the server really dropped the session
        if (res.status === 401) {
          const session = await fetch('/api/session').then((r) => r.json()).catch(() => null);
          if (session && !session.signed_in) {
            window.location.reload();
          }
        }
        throw new Error(message);
      }
      return res.status === 204 ? null : res.json();
    };

    const today = () => new Date().toISOString().split('T')[0];
    const toggle = (el, show) => el.classList.toggle('hidden', !show);

    // daily stats
    const statsForm = document.getElementById('stats-form');
    const loadStats = async () => {
      const data = await api('/api/daily-stats/today');
      const stats = data.stats || { steps: 0, calories_burned: 0 };
      document.getElementById('stats-steps').textContent = stats.steps.toLocaleString();
      document.getElementById('stats-calories').textContent = stats.calories_burned.toLocaleString();
      statsForm.steps.value = stats.steps;
      statsForm.calories_burned.value = stats.calories_burned;
    };
    document.getElementById('stats-edit').addEventListener('click', () => toggle(statsForm, true));
    document.getElementById('stats-cancel').addEventListener('click', () => toggle(statsForm, false));
    statsForm.addEventListener('submit', async (event) => {
      event.preventDefault();
      try {
        await api('/api/daily-stats/today', {
          method: 'PUT',
          body: JSON.stringify({
            steps: parseInt(statsForm.steps.value, 10),
            calories_burned: parseInt(statsForm.calories_burned.value, 10)
          })
        });
        toggle(statsForm, false);
        setStatus('Stats saved', 'ok');
        await loadStats();
      } catch (err) {
        report(err);
      }
    });

    // goals
    const goalForm = document.getElementById('goal-form');
    const goalList = document.getElementById('goal-list');
    let editingGoal = null;
    const openGoalForm = (goal) => {
      editingGoal = goal ? goal.id : null;
      goalForm.goal_type.value = goal ? goal.goal_type : 'steps';
      goalForm.target_value.value = goal ? goal.target_value : '';
      goalForm.timeframe.value = goal ? goal.timeframe : 'daily';
      document.getElementById('goal-submit').textContent = goal ? 'Update' : 'Create';
      toggle(goalForm, true);
    };
    const loadGoals = async () => {
      const goals = await api('/api/goals');
      if (!goals.length) {
        goalList.innerHTML = '<li class="muted">No active goals yet.</li>';
        return;
      }
      goalList.innerHTML = goals.map((goal) => `
        <li data-id="${goal.id}">
          <div class="item-head">
            <strong>${escapeHtml(goal.label)} &middot; <span class="muted">${goal.timeframe}</span></strong>
            <span>
              <button class="danger" data-action="edit">Edit</button>
              <button class="danger" data-action="archive">Archive</button>
              <button class="danger" data-action="delete">Delete</button>
            </span>
          </div>
          <div class="muted">${goal.current_value.toLocaleString()} / ${goal.target_value.toLocaleString()} (${goal.percentage}%)</div>
          <div class="progress-track"><div class="progress-fill" style="width: ${goal.percentage}%"></div></div>
          <div class="inline">
            <input type="number" min="0" placeholder="Progress" value="${goal.current_value}" />
            <button class="ghost" data-action="progress">Set</button>
          </div>
        </li>`).join('');
      goalList.querySelectorAll('li[data-id]').forEach((item) => {
        const goal = goals.find((g) => g.id === item.dataset.id);
        item.addEventListener('click', async (event) => {
          const action = event.target.dataset.action;
          if (!action) {
            return;
          }
          try {
            if (action === 'edit') {
              openGoalForm(goal);
              return;
            }
            if (action === 'progress') {
              const value = parseInt(item.querySelector('input').value, 10);
              await api(`/api/goals/${goal.id}/progress`, {
                method: 'PUT',
                body: JSON.stringify({ current_value: value })
              });
            } else if (action === 'archive') {
              await api(`/api/goals/${goal.id}/archive`, { method: 'POST' });
            } else if (action === 'delete') {
              await api(`/api/goals/${goal.id}`, { method: 'DELETE' });
            }
            await loadGoals();
          } catch (err) {
            report(err);
          }
        });
      });
    };
    document.getElementById('goal-new').addEventListener('click', () => openGoalForm(null));
    document.getElementById('goal-cancel').addEventListener('click', () => toggle(goalForm, false));
    goalForm.addEventListener('submit', async (event) => {
      event.preventDefault();
      const body = JSON.stringify({
        goal_type: goalForm.goal_type.value,
        target_value: parseInt(goalForm.target_value.value, 10),
        timeframe: goalForm.timeframe.value
      });
      try {
        if (editingGoal) {
          await api(`/api/goals/${editingGoal}`, { method: 'PUT', body });
        } else {
          await api('/api/goals', { method: 'POST', body });
        }
        toggle(goalForm, false);
        editingGoal = null;
        await loadGoals();
      } catch (err) {
        report(err);
      }
    });

    // progress chart
    const chartEl = document.getElementById('chart');
    const summaryEl = document.getElementById('progress-summary');
    const tabs = Array.from(document.querySelectorAll('.tab'));
    let activeMetric = 'steps';
    const loadProgress = async () => {
      const data = await api(`/api/progress?metric=${activeMetric}`);
      const trend = data.trend === null ? 'n/a' : `${data.trend > 0 ? '+' : ''}${data.trend}%`;
      summaryEl.textContent = `${data.label}: average ${data.average.toLocaleString()} per day, trend ${trend}`;
      chartEl.innerHTML = data.bars.map((bar) => `
        <div class="bar-col" title="${bar.value.toLocaleString()}">
          <div class="bar" data-metric="${data.metric}" style="height: ${bar.height_percent}%"></div>
          <span class="bar-label">${escapeHtml(bar.label)}</span>
        </div>`).join('');
    };
    tabs.forEach((button) => {
      button.addEventListener('click', () => {
        activeMetric = button.dataset.metric;
        tabs.forEach((tab) => {
          const isActive = tab === button;
          tab.classList.toggle('active', isActive);
          tab.setAttribute('aria-selected', String(isActive));
        });
        loadProgress().catch(report);
      });
    });

    // workout log
    const workoutForm = document.getElementById('workout-form');
    const workoutList = document.getElementById('workout-list');
    const resetWorkoutForm = () => {
      workoutForm.reset();
      workoutForm.date.value = today();
    };
    const loadWorkouts = async () => {
      const workouts = await api('/api/workouts');
      if (!workouts.length) {
        workoutList.innerHTML = '<li class="muted">No workouts logged yet.</li>';
        return;
      }
      workoutList.innerHTML = workouts.map((workout) => `
        <li>
          <div class="item-head">
            <strong>${escapeHtml(workout.name)}</strong>
            <button class="danger" data-id="${workout.id}">Delete</button>
          </div>
          <div class="muted">${workout.date} &middot; ${workout.duration_minutes} min &middot; ${workout.calories_burned} cal</div>
          ${workout.notes ? `<div>${escapeHtml(workout.notes)}</div>` : ''}
        </li>`).join('');
    };
    workoutList.addEventListener('click', async (event) => {
      const id = event.target.dataset.id;
      if (!id) {
        return;
      }
      try {
        await api(`/api/workouts/${id}`, { method: 'DELETE' });
        await loadWorkouts();
      } catch (err) {
        report(err);
      }
    });
    document.getElementById('workout-new').addEventListener('click', () => toggle(workoutForm, true));
    document.getElementById('workout-cancel').addEventListener('click', () => toggle(workoutForm, false));
    workoutForm.addEventListener('submit', async (event) => {
      event.preventDefault();
      try {
        await api('/api/workouts', {
          method: 'POST',
          body: JSON.stringify({
            name: workoutForm.elements.namedItem('name').value,
            duration_minutes: parseInt(workoutForm.duration_minutes.value, 10),
            calories_burned: parseInt(workoutForm.calories_burned.value, 10),
            notes: workoutForm.notes.value,
            date: workoutForm.date.value
          })
        });
        resetWorkoutForm();
        toggle(workoutForm, false);
        setStatus('Workout logged', 'ok');
        await loadWorkouts();
      } catch (err) {
        report(err);
      }
    });

    document.getElementById('sign-out').addEventListener('click', async () => {
      try {
        await api('/api/auth/sign-out', { method: 'POST' });
        window.location.reload();
      } catch (err) {
        report(err);
      }
    });

    resetWorkoutForm();
    loadStats().catch(report);
    loadGoals().catch(report);
    loadProgress().catch(report);
    loadWorkouts().catch(report);
  </script>"#;
