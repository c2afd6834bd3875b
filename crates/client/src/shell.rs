//! Line-oriented shell driving the headless views.
//!
//! Every command names the route it belongs to and is routed through the
//! guard before its view is mounted.

use std::io::Write as _;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use trafficdesk_auth::{Credentials, RouteDecision};
use trafficdesk_core::{
    Fine, NewPersonnel, RecordId, RecordPatch, RuleDraft, RuleId, ViolationEntry,
};

use crate::app::App;
use crate::navigation::Route;
use crate::render;
use crate::views::{
    AddRecordView, DashboardView, HeaderView, LoginView, ProfileView, RecordsView, RegisterView,
    RulesView, SearchView, UsersView, ViewError,
};

const PROMPT: &str = "trafficdesk> ";

#[derive(Parser, Debug)]
#[command(multicall = true)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in with badge number and password
    Login { badge_number: String, password: String },
    /// Sign out
    Logout,
    /// Show the current session
    Whoami,
    /// Navigate to a path (e.g. /records)
    Open { path: String },
    /// Show the dashboard
    Dashboard,
    /// List personnel
    Users,
    /// Register new personnel (admin only)
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        mobile: String,
        #[arg(long)]
        address: String,
        #[arg(long)]
        badge: String,
        #[arg(long)]
        password: String,
    },
    /// List traffic rules
    Rules {
        /// Case-insensitive title filter
        #[arg(long)]
        filter: Option<String>,
    },
    /// Create a rule
    RuleAdd { title: String, fine: Fine },
    /// Update a rule
    RuleEdit {
        id: RuleId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        fine: Option<Fine>,
    },
    /// Delete a rule
    RuleRm { id: RuleId },
    /// List violation records
    Records {
        /// Show one record in full
        #[arg(long)]
        show: Option<RecordId>,
    },
    /// Create a violation record
    RecordAdd {
        #[arg(long)]
        license: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        sex: String,
        #[arg(long)]
        age: Option<u32>,
        #[arg(long, default_value = "")]
        dob: String,
        #[arg(long, default_value = "")]
        address: String,
        /// `TITLE=FINE`, repeatable
        #[arg(long = "violation", value_parser = parse_violation)]
        violations: Vec<ViolationEntry>,
        /// Photo to upload
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Update fields of a violation record
    RecordEdit {
        id: RecordId,
        #[arg(long)]
        license: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        sex: Option<String>,
        #[arg(long)]
        age: Option<u32>,
        #[arg(long)]
        dob: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },
    /// Delete a violation record
    RecordRm { id: RecordId },
    /// Look a record up by license number
    Search { license_number: String },
    /// Show your profile
    Profile,
    /// Edit your profile
    ProfileEdit {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        mobile: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },
    /// Change your password
    Passwd {
        current: String,
        new: String,
        confirm: String,
    },
    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

impl Command {
    fn route(&self) -> Option<Route> {
        Some(match self {
            Self::Login { .. } => Route::Login,
            Self::Dashboard => Route::Dashboard,
            Self::Users => Route::Users,
            Self::Register { .. } => Route::RegisterUser,
            Self::Rules { .. } | Self::RuleAdd { .. } | Self::RuleEdit { .. } | Self::RuleRm { .. } => {
                Route::Rules
            }
            Self::Records { .. } | Self::RecordEdit { .. } | Self::RecordRm { .. } => Route::Records,
            Self::RecordAdd { .. } => Route::AddRecord,
            Self::Search { .. } => Route::SearchRecord,
            Self::Profile | Self::ProfileEdit { .. } | Self::Passwd { .. } => Route::Profile,
            Self::Logout | Self::Whoami | Self::Open { .. } | Self::Quit => return None,
        })
    }
}

fn parse_violation(raw: &str) -> Result<ViolationEntry, String> {
    let (title, fine) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected TITLE=FINE, got {raw:?}"))?;
    let fine: Fine = fine.trim().parse().map_err(|e| format!("{e}"))?;
    Ok(ViolationEntry::new(title.trim(), fine))
}

/// Split a line into words, honouring single/double quotes and backslash escapes.
pub fn split_line(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (None, '"' | '\'') => {
                quote = Some(c);
                in_word = true;
            }
            (q, '\\') if q != Some('\'') => match chars.next() {
                Some(escaped) => {
                    current.push(escaped);
                    in_word = true;
                }
                None => return Err("trailing backslash".to_string()),
            },
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (_, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err("unterminated quote".to_string());
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug)]
pub struct Shell {
    app: App,
}

impl Shell {
    pub fn new(app: App) -> Self {
        Self { app }
    }

    /// Read commands from stdin until `quit` or end of input.
    pub async fn run(&self) -> anyhow::Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("{PROMPT}");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            if self.execute(&line).await == Flow::Quit {
                break;
            }
        }
        Ok(())
    }

    pub async fn execute(&self, line: &str) -> Flow {
        let words = match split_line(line) {
            Ok(words) if words.is_empty() => return Flow::Continue,
            Ok(words) => words,
            Err(err) => {
                println!("{err}");
                return Flow::Continue;
            }
        };

        let command = match Line::try_parse_from(words) {
            Ok(line) => line.command,
            Err(err) => {
                let _ = err.print();
                return Flow::Continue;
            }
        };

        if matches!(command, Command::Quit) {
            return Flow::Quit;
        }

        if let Some(route) = command.route() {
            if !self.enter(route) {
                return Flow::Continue;
            }
        }

        // Failures have already been reported through the notification channel.
        if let Err(err) = self.dispatch(command).await {
            tracing::debug!(error = %err, "command did not complete");
        }
        Flow::Continue
    }

    /// Navigate to `route` through the guard. Returns whether the view may run.
    fn enter(&self, route: Route) -> bool {
        // Staying on the login page keeps the remembered return location.
        if route == Route::Login && self.app.navigator.route() == Route::Login {
            return true;
        }

        match self.app.open_route(route) {
            RouteDecision::Allow => true,
            RouteDecision::RedirectToLogin { .. } => {
                println!("Please log in first.");
                false
            }
            RouteDecision::RedirectToDashboard => {
                println!("{} is available to administrators only.", route.title());
                false
            }
        }
    }

    async fn dispatch(&self, command: Command) -> Result<(), ViewError> {
        let app = &self.app;
        match command {
            Command::Login { badge_number, password } => {
                let Some(view) = LoginView::mount(app) else {
                    println!("Already signed in.");
                    return Ok(());
                };
                view.submit(Credentials::new(badge_number, password)).await?;
            }
            Command::Logout => {
                HeaderView::mount(app).logout().await?;
            }
            Command::Whoami => {
                let session = HeaderView::mount(app).session();
                match session.role() {
                    Some(role) => println!("Signed in as {role}. At {}.", app.navigator.route()),
                    None => println!("Not signed in."),
                }
            }
            Command::Open { path } => {
                let decision = app.open(&path);
                let location = app.navigator.current();
                match decision {
                    RouteDecision::Allow => println!("{}", location.route.title()),
                    RouteDecision::RedirectToLogin { from } => {
                        println!("Please log in first; you will return to {from}.")
                    }
                    RouteDecision::RedirectToDashboard => {
                        println!("Administrators only; showing the dashboard.")
                    }
                }
            }
            Command::Dashboard => {
                print!("{}", render::dashboard_cards(DashboardView::mount(app).cards()));
            }
            Command::Users => {
                let mut view = UsersView::mount(app);
                let users = view.load().await?;
                print!("{}", render::personnel_table(users));
            }
            Command::Register { name, mobile, address, badge, password } => {
                RegisterView::mount(app)
                    .submit(NewPersonnel {
                        name,
                        mobile,
                        address,
                        badge_number: badge,
                        password,
                    })
                    .await?;
            }
            Command::Rules { filter } => {
                let mut view = RulesView::mount(app);
                view.load().await?;
                view.set_filter(filter.unwrap_or_default());
                print!("{}", render::rules_table(&view.visible()));
            }
            Command::RuleAdd { title, fine } => {
                let draft = match RuleDraft::new(title, fine) {
                    Ok(draft) => draft,
                    Err(err) => {
                        app.notifier.warning(err.message());
                        return Err(ViewError::Invalid(err.message().to_string()));
                    }
                };
                RulesView::mount(app).save(None, draft).await?;
            }
            Command::RuleEdit { id, title, fine } => {
                let mut view = RulesView::mount(app);
                view.load().await?;
                let Some(existing) = view.find(&id) else {
                    app.notifier.warning(format!("No rule with id {id}"));
                    return Err(ViewError::Invalid(format!("unknown rule {id}")));
                };
                let mut draft = RuleDraft::from(existing);
                if let Some(title) = title {
                    draft.title = title;
                }
                if let Some(fine) = fine {
                    draft.fine = fine;
                }
                view.save(Some(&id), draft).await?;
            }
            Command::RuleRm { id } => {
                RulesView::mount(app).delete(&id).await?;
            }
            Command::Records { show } => {
                let mut view = RecordsView::mount(app);
                view.load().await?;
                match show {
                    Some(id) => match view.find(&id) {
                        Some(record) => print!("{}", render::record_detail(record)),
                        None => println!("No record with id {id}."),
                    },
                    None => {
                        print!("{}", render::records_table(view.records()));
                        println!("Total fines: {}", view.total_fines());
                    }
                }
            }
            Command::RecordAdd {
                license,
                name,
                sex,
                age,
                dob,
                address,
                violations,
                image,
            } => {
                let mut view = AddRecordView::mount(app);
                {
                    let draft = view.draft_mut();
                    draft.license_num = license;
                    draft.name = name;
                    draft.sex = sex;
                    draft.age = age;
                    draft.dob = dob;
                    draft.address = address;
                }
                for entry in violations {
                    view.add_violation(entry);
                }
                if let Some(path) = image {
                    view.attach_image(&path).await?;
                }
                view.submit().await?;
            }
            Command::RecordEdit {
                id,
                license,
                name,
                sex,
                age,
                dob,
                address,
            } => {
                let patch = RecordPatch {
                    license_num: license,
                    name,
                    sex,
                    age,
                    dob,
                    address,
                    violation_records: None,
                };
                RecordsView::mount(app).update(&id, patch).await?;
            }
            Command::RecordRm { id } => {
                RecordsView::mount(app).delete(&id).await?;
            }
            Command::Search { license_number } => {
                let mut view = SearchView::mount(app);
                if let Some(record) = view.search(&license_number).await? {
                    print!("{}", render::record_detail(record));
                }
            }
            Command::Profile => {
                let mut view = ProfileView::mount(app);
                let profile = view.load().await?;
                print!("{}", render::profile_block(profile));
            }
            Command::ProfileEdit { name, mobile, address } => {
                let mut view = ProfileView::mount(app);
                view.load().await?;
                let Some(mut update) = view.edit() else {
                    return Ok(());
                };
                if let Some(name) = name {
                    update.name = name;
                }
                if let Some(mobile) = mobile {
                    update.mobile = mobile;
                }
                if let Some(address) = address {
                    update.address = address;
                }
                view.save(update).await?;
            }
            Command::Passwd { current, new, confirm } => {
                ProfileView::mount(app)
                    .change_password(current, new, &confirm)
                    .await?;
            }
            Command::Quit => {}
        }
        Ok(())
    }
}
