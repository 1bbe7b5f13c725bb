use std::time::Duration;

pub fn make_bar(pos: u64, len: u64, width: usize) -> String {
	let width = width.max(1);
	let frac = (pos as f64 / len.max(1) as f64).clamp(0.0, 1.0);
	let exact = frac * width as f64;
	let whole = (exact.floor() as usize).min(width);

	// eighth-block partials, thickest first
	const PARTIALS: [char; 8] = [' ', '▏', '▎', '▍', '▌', '▋', '▊', '▉'];

	let mut bar = "█".repeat(whole);
	if whole < width {
		let eighths = ((exact - whole as f64) * 8.0).floor() as usize;
		bar.push(PARTIALS[eighths.min(7)]);
		bar.push_str(&" ".repeat(width - whole - 1));
	}
	bar
}

pub fn format_rate(per_sec: f64) -> String {
	if per_sec.is_finite() {
		human_number(per_sec) + "/s"
	} else {
		"--/s".to_string()
	}
}

pub fn human_number(v: f64) -> String {
	let abs = v.abs();
	if abs >= 1e9 {
		format!("{:.1}G", v / 1e9)
	} else if abs >= 1e6 {
		format!("{:.1}M", v / 1e6)
	} else if abs >= 1e3 {
		format!("{:.1}k", v / 1e3)
	} else {
		format!("{v:.0}")
	}
}

pub fn format_eta(d: Duration) -> String {
	let total = d.as_secs();
	let hours = total / 3_600;
	let minutes = (total % 3_600) / 60;
	let seconds = total % 60;
	match total {
		0..60 => format!("{seconds}s"),
		60..3_600 => format!("{minutes:02}:{seconds:02}"),
		_ => format!("{hours}:{minutes:02}:{seconds:02}"),
	}
}
