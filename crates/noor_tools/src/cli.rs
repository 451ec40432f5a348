#![forbid(unsafe_code)]

use std::fmt::Write as _;
use std::sync::Arc;

use noor_engines::roster::{MemberDirectory, RosterSource, StaticRoster};
use noor_engines::LeaderboardProjection;
use noor_kernel_contracts::member::{MemberId, MemberProfile};
use noor_kernel_contracts::progress::{
    PART_MAX, PART_MIN, SECTION_MAX, SECTION_MIN, VERSE_MIN,
};
use noor_kernel_contracts::ranking::{RankTier, VisibleWindow};
use noor_kernel_contracts::{ContractViolation, UnixTimeMs};
use noor_os::{
    ChangeBus, GateOutcome, LeaderboardPipeline, LeaderboardView, MemberGate, OnboardingFlag,
    ProgressSession,
};
use noor_storage::KeyValueStore;

use crate::config::{parse_window, ToolConfig};

pub const USAGE: &str = "usage: noor <members|enroll|pin|progress|show|leaderboard|onboarding> [args]\n\
  noor members\n\
  noor enroll <name>\n\
  noor pin <member>\n\
  noor progress <member> <part> <section> <verse>\n\
  noor show <member>\n\
  noor leaderboard [N|all]\n\
  noor onboarding [done]";

/// Source of PIN input; a terminal prompt in the binary, a script in tests.
pub trait PinPrompt {
    fn read_pin(&mut self, prompt: &str) -> Result<String, String>;
}

pub struct NoorContext {
    store: Arc<dyn KeyValueStore>,
    bus: ChangeBus,
    gate: MemberGate,
    roster: Arc<dyn RosterSource>,
    config: ToolConfig,
}

impl NoorContext {
    pub fn with_seed(store: Arc<dyn KeyValueStore>, config: ToolConfig) -> Result<Self, String> {
        let directory = MemberDirectory::seed().map_err(|e| format!("member seed: {e}"))?;
        let roster = StaticRoster::seed().map_err(|e| format!("roster seed: {e}"))?;
        let gate = MemberGate::load(directory, store.clone()).map_err(|e| e.to_string())?;
        Ok(Self {
            gate,
            store,
            bus: ChangeBus::new(),
            roster: Arc::new(roster),
            config,
        })
    }

    fn pipeline(&self) -> LeaderboardPipeline {
        LeaderboardPipeline::new(self.store.clone(), self.roster.clone())
    }
}

pub fn execute_command(
    ctx: &mut NoorContext,
    args: &[String],
    pins: &mut dyn PinPrompt,
) -> Result<String, String> {
    let Some(command) = args.first() else {
        return Err(USAGE.to_string());
    };
    let rest = &args[1..];
    match command.as_str() {
        "members" => list_members(ctx),
        "enroll" => {
            let name = rest.join(" ");
            if name.trim().is_empty() {
                return Err("usage: noor enroll <name>".to_string());
            }
            let profile = ctx.gate.enroll(&name, None).map_err(|e| e.to_string())?;
            Ok(format!(
                "Enrolled {} as {}. run `noor pin {}` next",
                profile.display_name, profile.member_id, profile.member_id
            ))
        }
        "pin" => {
            let profile = require_member(ctx, rest.first())?;
            if ctx.gate.has_pin(&profile.member_id).map_err(|e| e.to_string())? {
                return Err(format!("a PIN is already set for {}", profile.display_name));
            }
            let pin = pins.read_pin(&format!("Create PIN for {} (4-8 digits):", profile.display_name))?;
            let confirm = pins.read_pin("Confirm PIN:")?;
            ctx.gate
                .set_pin(&profile.member_id, &pin, &confirm)
                .map_err(|e| e.to_string())?;
            Ok(format!("PIN set for {}", profile.display_name))
        }
        "progress" => {
            if rest.len() != 4 {
                return Err("usage: noor progress <member> <part> <section> <verse>".to_string());
            }
            let part = parse_unit::<u8>("part", &rest[1], PART_MIN as i64, PART_MAX as i64)?;
            let section =
                parse_unit::<u8>("section", &rest[2], SECTION_MIN as i64, SECTION_MAX as i64)?;
            let verse = parse_unit::<u32>("verse", &rest[3], VERSE_MIN as i64, u32::MAX as i64)?;
            let profile = authenticate(ctx, rest.first(), pins)?;

            let view = LeaderboardView::open(&ctx.bus, ctx.pipeline(), VisibleWindow::All);
            let session = ProgressSession::open(profile, ctx.store.clone(), ctx.bus.clone());
            let saved = session
                .save_units(part, section, verse, UnixTimeMs::now())
                .map_err(|e| e.to_string())?;
            let board = view.projection();
            let mut out = format!("Progress updated: {}", saved.position);
            if let Some(entry) = board.position_of(&saved.member_id) {
                let _ = write!(out, " (rank #{} of {})", entry.rank, board.total());
            }
            Ok(out)
        }
        "show" => {
            let profile = authenticate(ctx, rest.first(), pins)?;
            let session = ProgressSession::open(profile, ctx.store.clone(), ctx.bus.clone());
            Ok(format!(
                "{}: {}",
                session.profile().display_name,
                session.summary()
            ))
        }
        "leaderboard" => {
            let window = match rest.first() {
                Some(raw) => parse_window(raw)
                    .ok_or_else(|| format!("expected a number or 'all', got '{raw}'"))?,
                None => ctx.config.leaderboard_window,
            };
            let pipeline = ctx.pipeline();
            let board = pipeline.run(window);
            let local = pipeline.read_local();
            Ok(render_board(&board, local.as_ref().map(|r| &r.member_id)))
        }
        "onboarding" => {
            let flag = OnboardingFlag::new(ctx.store.clone());
            match rest.first().map(String::as_str) {
                Some("done") => {
                    flag.mark_completed().map_err(|e| e.to_string())?;
                    Ok("onboarding completed".to_string())
                }
                Some(other) => Err(format!("unknown onboarding argument: {other}")),
                None => {
                    let done = flag.has_completed().map_err(|e| e.to_string())?;
                    Ok(if done { "completed" } else { "not completed" }.to_string())
                }
            }
        }
        other => Err(format!("unknown command: {other}\n{USAGE}")),
    }
}

/// One line per visible entry: `*` marks the champion, `+` the rest of the podium. When the
/// device's own entry falls outside the window its rank is appended.
pub fn render_board(
    board: &LeaderboardProjection,
    local: Option<&MemberId>,
) -> String {
    if board.total() == 0 {
        return "No progress recorded yet".to_string();
    }
    let mut out = String::new();
    for entry in board.entries() {
        let marker = match entry.tier() {
            RankTier::Champion => '*',
            RankTier::Podium => '+',
            RankTier::Standard => ' ',
        };
        let _ = writeln!(
            out,
            "{marker} {:>3}. {:<16} {}",
            entry.rank, entry.record.display_name, entry.record.position
        );
    }
    if let Some(me) = local.and_then(|id| board.position_of(id)) {
        if me.rank as usize > board.visible_len() {
            let _ = writeln!(out, "  ...  you: #{} {}", me.rank, me.record.display_name);
        }
    }
    out.trim_end().to_string()
}

fn list_members(ctx: &NoorContext) -> Result<String, String> {
    let mut lines = Vec::new();
    for m in ctx.gate.directory().members() {
        let pin = if ctx.gate.has_pin(&m.member_id).map_err(|e| e.to_string())? {
            "pin set"
        } else {
            "no pin"
        };
        lines.push(format!("{}\t{}\t{}", m.member_id, m.display_name, pin));
    }
    Ok(lines.join("\n"))
}

fn require_member(ctx: &NoorContext, raw: Option<&String>) -> Result<MemberProfile, String> {
    let raw = raw.ok_or_else(|| "missing member name or id".to_string())?;
    ctx.gate
        .directory()
        .resolve(raw)
        .cloned()
        .ok_or_else(|| format!("unknown or ambiguous member '{raw}'. run `noor members`"))
}

fn authenticate(
    ctx: &NoorContext,
    raw: Option<&String>,
    pins: &mut dyn PinPrompt,
) -> Result<MemberProfile, String> {
    let profile = require_member(ctx, raw)?;
    if !ctx.gate.has_pin(&profile.member_id).map_err(|e| e.to_string())? {
        return Err(format!(
            "no PIN set for {}. run `noor pin {}` first",
            profile.display_name, profile.member_id
        ));
    }
    let pin = pins.read_pin(&format!("PIN for {}:", profile.display_name))?;
    match ctx
        .gate
        .authenticate(&profile.member_id, &pin)
        .map_err(|e| e.to_string())?
    {
        GateOutcome::Granted(p) => Ok(p),
        GateOutcome::PinSetupRequired(p) => Err(format!("no PIN set for {}", p.display_name)),
        GateOutcome::Denied => Err("invalid PIN".to_string()),
    }
}

fn parse_unit<T: TryFrom<i64>>(
    field: &'static str,
    raw: &str,
    min: i64,
    max: i64,
) -> Result<T, String> {
    let got: i64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("{field} must be a whole number, got '{raw}'"))?;
    if got < min || got > max {
        return Err(ContractViolation::InvalidRange {
            field,
            min,
            max,
            got,
        }
        .to_string());
    }
    T::try_from(got).map_err(|_| format!("{field} {got} does not fit"))
}
