use crate::error::CatalogError;
use crate::scenario::catalog::StateCatalog;
use crate::scenario::state::{Choice, ScenarioState};

/// Entry point used when no (or an unknown) scenario is requested.
pub const DEFAULT_START: &str = "phishing_received";

fn decision(id: &str, title: &str, body: &str, choices: Vec<Choice>) -> ScenarioState {
    ScenarioState {
        id: id.into(),
        title: title.into(),
        body: body.into(),
        is_terminal: false,
        choices,
    }
}

fn ending(id: &str, title: &str, body: &str) -> ScenarioState {
    ScenarioState {
        id: id.into(),
        title: title.into(),
        body: body.into(),
        is_terminal: true,
        choices: vec![],
    }
}

fn choice(id: &str, label: &str, next: &str, xp: i64, breach: i64, feedback: &str) -> Choice {
    Choice {
        id: id.into(),
        label: label.into(),
        next_state_id: next.into(),
        xp_delta: xp,
        breach_delta: breach,
        feedback: feedback.into(),
    }
}

// ---------------------------------------------------------------------------
// Breach simulation scenarios
// ---------------------------------------------------------------------------

/// The phishing, USB drop and vishing drills.
pub fn breach_simulation() -> Result<StateCatalog, CatalogError> {
    let states = vec![
        // --- Phishing email ---
        decision(
            "phishing_received",
            "Suspicious Email",
            "An email from \"IT Support\" says your mailbox is almost full and asks you to \
             log in through a link to keep receiving mail. The sender domain is one letter \
             off from your company's.",
            vec![
                choice(
                    "report_it",
                    "Report it to the security team",
                    "reported_safe",
                    50,
                    -10,
                    "Good call. Reporting lets the team block the sender for everyone.",
                ),
                choice(
                    "click_link",
                    "Click the link and log in",
                    "malware_triggered",
                    0,
                    35,
                    "The page was a lookalike. A payload ran the moment it loaded.",
                ),
                choice(
                    "reply_sender",
                    "Reply and ask if it is legitimate",
                    "credential_request",
                    5,
                    15,
                    "Replying confirms your address is live and opens a conversation with the attacker.",
                ),
            ],
        ),
        decision(
            "credential_request",
            "The Attacker Replies",
            "Within minutes \"IT Support\" answers: to verify you, they need your username \
             and current password. They say your account will be locked in 10 minutes.",
            vec![
                choice(
                    "send_credentials",
                    "Send the credentials",
                    "account_compromised",
                    0,
                    40,
                    "Real IT staff never ask for your password. Urgency is a pressure tactic.",
                ),
                choice(
                    "verify_by_phone",
                    "Call the help desk on the number from the intranet",
                    "reported_safe",
                    40,
                    -15,
                    "Verifying through a channel you already trust breaks the attack.",
                ),
                choice(
                    "ignore",
                    "Ignore it and move on",
                    "ignored_threat",
                    10,
                    5,
                    "You are safe, but nobody else knows this campaign is running.",
                ),
            ],
        ),
        decision(
            "malware_triggered",
            "Something Is Running",
            "Your fans spin up and files on the shared drive start getting renamed with a \
             strange extension.",
            vec![
                choice(
                    "disconnect",
                    "Pull the network cable and unplug Wi-Fi",
                    "contained",
                    20,
                    10,
                    "Isolating the machine stopped the spread to shared drives.",
                ),
                choice(
                    "call_helpdesk",
                    "Call the help desk first",
                    "helpdesk_triage",
                    15,
                    15,
                    "Escalating is right, but the machine kept encrypting while you waited.",
                ),
                choice(
                    "keep_working",
                    "Ignore it and keep working",
                    "ransomware_spread",
                    0,
                    40,
                    "Every minute online let the malware reach more systems.",
                ),
            ],
        ),
        decision(
            "helpdesk_triage",
            "Help Desk On The Line",
            "The analyst asks what you see. More files are changing as you talk.",
            vec![
                choice(
                    "isolate_now",
                    "Disconnect while staying on the call",
                    "contained",
                    20,
                    5,
                    "Containing first and explaining second limited the damage.",
                ),
                choice(
                    "reboot",
                    "Reboot to see if it goes away",
                    "ransomware_spread",
                    0,
                    30,
                    "Rebooting destroyed memory evidence and the malware came back at startup.",
                ),
            ],
        ),
        decision(
            "account_compromised",
            "Account Takeover",
            "You get a login alert from another country. Your sent folder has messages you \
             never wrote.",
            vec![
                choice(
                    "reset_password",
                    "Reset your password and report the incident",
                    "contained",
                    25,
                    -10,
                    "Fast reporting let the team revoke sessions before data left.",
                ),
                choice(
                    "hide_it",
                    "Delete the sent messages and say nothing",
                    "ransomware_spread",
                    0,
                    30,
                    "Hiding the incident gave the attacker days of undetected access.",
                ),
            ],
        ),
        // --- USB drop ---
        decision(
            "usb_found",
            "USB Drive In The Parking Lot",
            "A USB stick labelled \"Payroll Q3 - Confidential\" is lying next to your car.",
            vec![
                choice(
                    "hand_to_security",
                    "Hand it to the security team unopened",
                    "usb_reported",
                    45,
                    -10,
                    "Dropped drives are a classic lure. Security can analyse it safely.",
                ),
                choice(
                    "plug_in",
                    "Plug it in to find the owner",
                    "malware_triggered",
                    0,
                    40,
                    "The drive posed as a keyboard and typed commands the moment it connected.",
                ),
                choice(
                    "throw_away",
                    "Throw it in the bin",
                    "usb_discarded",
                    15,
                    0,
                    "Safe for you, but the team never learns someone is targeting the office.",
                ),
            ],
        ),
        // --- Voice phishing ---
        decision(
            "vishing_call",
            "A Call From \"IT\"",
            "A caller says they are migrating your account and need the six-digit code that \
             just arrived on your phone.",
            vec![
                choice(
                    "hang_up_and_verify",
                    "Hang up and call IT on the published number",
                    "reported_safe",
                    50,
                    -10,
                    "A one-time code is only for you. Calling back on a known number is the right move.",
                ),
                choice(
                    "ask_questions",
                    "Ask for their name and ticket number",
                    "vishing_pressure",
                    10,
                    5,
                    "Questions help, but attackers prepare convincing answers.",
                ),
                choice(
                    "give_code",
                    "Read out the code",
                    "account_compromised",
                    0,
                    45,
                    "The code was your MFA prompt. The caller is now logged in as you.",
                ),
            ],
        ),
        decision(
            "vishing_pressure",
            "The Caller Pushes Back",
            "The caller gives a plausible ticket number and says your manager approved this. \
             They are getting impatient.",
            vec![
                choice(
                    "hang_up_and_verify",
                    "Hang up and verify with IT directly",
                    "reported_safe",
                    40,
                    -5,
                    "Pressure and name-dropping are social engineering signals.",
                ),
                choice(
                    "give_code",
                    "Give in and read the code",
                    "account_compromised",
                    0,
                    40,
                    "Authority pressure worked. The attacker has your session.",
                ),
            ],
        ),
        // --- Terminal states ---
        ending(
            "reported_safe",
            "Threat Reported",
            "The security team confirms a phishing campaign and blocks it company-wide.",
        ),
        ending(
            "contained",
            "Incident Contained",
            "The affected machine is isolated and reimaged. Damage is limited to one host.",
        ),
        ending(
            "ransomware_spread",
            "Ransomware Outbreak",
            "Shared drives are encrypted and a ransom note appears on every screen.",
        ),
        ending(
            "ignored_threat",
            "Threat Lingers",
            "You stayed safe, but three colleagues fell for the same email that afternoon.",
        ),
        ending(
            "usb_reported",
            "Drive Analysed",
            "The drive carried a keystroke-injection payload. A warning goes out to all staff.",
        ),
        ending(
            "usb_discarded",
            "Out Of Sight",
            "The drive is gone, and so is the chance to warn anyone about it.",
        ),
    ];

    StateCatalog::new(
        states,
        vec![
            DEFAULT_START.into(),
            "usb_found".into(),
            "vishing_call".into(),
        ],
        DEFAULT_START,
    )
}
