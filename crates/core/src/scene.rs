//! Scene sequencing and session state.
//!
//! The user journey is a fixed state machine:
//! login → profile → mode choice → capture → loading → result. This module
//! owns the [`Session`] value and funnels every mutation through explicit
//! transition methods. Consumers read the session; they never mutate it.
//!
//! The analysis call completes on a background thread and cannot be
//! cancelled once started. Completions are therefore tagged with a
//! [`RequestToken`] and checked against the controller's current token and
//! scene before being applied, so a late response can never force an
//! unwanted transition.

use crate::analysis::AnalysisResult;

/// One discrete step of the user journey. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scene {
    Login,
    Profile,
    ModeChoice,
    CaptureFace,
    CaptureHand,
    Loading,
    Result,
}

/// Which analysis the user picked on the mode-choice scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    Face,
    Hand,
}

impl CaptureMode {
    fn scene(self) -> Scene {
        match self {
            CaptureMode::Face => Scene::CaptureFace,
            CaptureMode::Hand => Scene::CaptureHand,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hand {
    Left,
    Right,
}

/// User-entered profile fields.
#[derive(Debug, Clone, Default)]
pub struct Profile {
    pub name: String,
    /// Birth date as typed; complete when exactly 8 ASCII digits.
    pub birth: String,
    pub gender: Option<Gender>,
    pub dominant_hand: Option<Hand>,
}

impl Profile {
    /// The profile-complete guard: all four fields are required.
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty()
            && self.birth.len() == 8
            && self.birth.chars().all(|c| c.is_ascii_digit())
            && self.gender.is_some()
            && self.dominant_hand.is_some()
    }
}

/// Opaque tag for one analysis request, used by the stale-response guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

/// The whole per-run state: active scene, profile, captured still and
/// analysis result. `analysis` is `Some` exactly while the scene is
/// [`Scene::Result`].
#[derive(Debug, Clone)]
pub struct Session {
    pub scene: Scene,
    pub profile: Profile,
    /// PNG bytes of the captured still, set before entering Loading and
    /// retained through Result for the overlay.
    pub captured_image: Option<Vec<u8>>,
    pub analysis: Option<AnalysisResult>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            scene: Scene::Login,
            profile: Profile::default(),
            captured_image: None,
            analysis: None,
        }
    }
}

/// Owns the [`Session`] and exposes every legal transition.
#[derive(Debug, Default)]
pub struct SceneController {
    session: Session,
    /// Capture scene that initiated the pending analysis, for failure
    /// recovery.
    pending_origin: Option<CaptureMode>,
    next_token: u64,
    current_token: Option<RequestToken>,
}

impl SceneController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn scene(&self) -> Scene {
        self.session.scene
    }

    pub fn profile_mut(&mut self) -> &mut Profile {
        &mut self.session.profile
    }

    /// Login → Profile.
    pub fn start(&mut self) {
        if self.session.scene == Scene::Login {
            self.session.scene = Scene::Profile;
        }
    }

    /// Profile → ModeChoice, guarded. Refusal is silent: no state change,
    /// returns `false`.
    pub fn complete_profile(&mut self) -> bool {
        if self.session.scene != Scene::Profile || !self.session.profile.is_complete() {
            return false;
        }
        self.session.scene = Scene::ModeChoice;
        true
    }

    /// ModeChoice → CaptureFace | CaptureHand.
    pub fn choose_mode(&mut self, mode: CaptureMode) {
        if self.session.scene == Scene::ModeChoice {
            self.session.scene = mode.scene();
        }
    }

    /// Records the still taken on the active capture scene.
    pub fn store_capture(&mut self, png: Vec<u8>) {
        if self.capture_mode().is_some() {
            self.session.captured_image = Some(png);
        }
    }

    /// Drops the stored still (retake on a capture scene).
    pub fn discard_capture(&mut self) {
        if self.capture_mode().is_some() {
            self.session.captured_image = None;
        }
    }

    pub fn captured_image(&self) -> Option<&[u8]> {
        self.session.captured_image.as_deref()
    }

    /// Capture* → Loading, only when a still has been captured. Returns
    /// the token the eventual completion must present.
    pub fn submit_photo(&mut self) -> Option<RequestToken> {
        let origin = self.capture_mode()?;
        self.session.captured_image.as_ref()?;

        self.pending_origin = Some(origin);
        self.session.scene = Scene::Loading;
        self.next_token += 1;
        let token = RequestToken(self.next_token);
        self.current_token = Some(token);
        Some(token)
    }

    /// Loading → Result. A completion carrying a stale token, or arriving
    /// after the user left Loading, is dropped.
    pub fn analysis_succeeded(&mut self, token: RequestToken, result: AnalysisResult) -> bool {
        if !self.accepts(token) {
            return false;
        }
        self.current_token = None;
        self.pending_origin = None;
        self.session.analysis = Some(result);
        self.session.scene = Scene::Result;
        true
    }

    /// Loading → originating capture scene. Discards the captured still;
    /// no partial result is preserved. Same stale guard as success.
    pub fn analysis_failed(&mut self, token: RequestToken) -> bool {
        if !self.accepts(token) {
            return false;
        }
        self.current_token = None;
        let origin = self.pending_origin.take().unwrap_or(CaptureMode::Hand);
        self.session.captured_image = None;
        self.session.analysis = None;
        self.session.scene = origin.scene();
        true
    }

    /// Single inverse edge per state. Discards forward state tied to the
    /// scene being left. Login and Loading have no back edge.
    pub fn back(&mut self) {
        match self.session.scene {
            Scene::Profile => self.session.scene = Scene::Login,
            Scene::ModeChoice => self.session.scene = Scene::Profile,
            Scene::CaptureFace | Scene::CaptureHand => {
                self.session.captured_image = None;
                self.session.scene = Scene::ModeChoice;
            }
            Scene::Result => {
                self.session.analysis = None;
                self.session.captured_image = None;
                self.session.scene = Scene::CaptureHand;
            }
            Scene::Login | Scene::Loading => {}
        }
    }

    /// The capture mode of the active scene, if it is a capture scene.
    pub fn capture_mode(&self) -> Option<CaptureMode> {
        match self.session.scene {
            Scene::CaptureFace => Some(CaptureMode::Face),
            Scene::CaptureHand => Some(CaptureMode::Hand),
            _ => None,
        }
    }

    fn accepts(&self, token: RequestToken) -> bool {
        self.session.scene == Scene::Loading && self.current_token == Some(token)
    }
}
