//! The sample game behind the bridge: a menu/in-game state machine, a
//! sprite world, a physics-driven player and the command queues the frame
//! protocol drains.
//!
//! Everything that must survive a hot reload lives in [`SaveState`];
//! renderables and command buffers are derived per frame and rebuilt on
//! deserialize so observable state matches the serialization instant.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use kagura_module_api::{
    AssetCommand, InputState, RawStr, RenderableObject, TextCommand, Transform, Vec2, Vec3, Vec4,
    ASSET_CMD_LOAD_TEXTURE, INVALID_ASSET_ID,
};

use crate::host::Host;
use crate::save::{SaveEnvelope, SaveError, SAVE_SCHEMA_VERSION};
use crate::ui::{self, Button, ButtonAction, Rect};

const TITLE_TEXTURE: &str = "assets/textures/title.png";
const PLAYER_TEXTURE: &str = "assets/textures/player.png";
const GROUND_TEXTURE: &str = "assets/textures/ground.png";

const MENU_BGM: &str = "assets/audio/menu_theme.ogg";
const STAGE_BGM: &str = "assets/audio/stage_theme.ogg";
const CLICK_SOUND: &str = "assets/audio/click.wav";
const LAND_SOUND: &str = "assets/audio/land.wav";

const SAVE_PATH: &str = "saves/slot0.json";

const QUAD_MESH_ID: u32 = 1;
const SPRITE_MATERIAL_ID: u32 = 1;

const CAMERA_SPEED: f32 = 0.1;

const TITLE_COLOR: Vec4 = Vec4 {
    x: 1.0,
    y: 0.9,
    z: 0.3,
    w: 1.0,
};
const HUD_COLOR: Vec4 = Vec4 {
    x: 0.8,
    y: 0.8,
    z: 0.1,
    w: 1.0,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    MainMenu,
    InGame,
}

/// A drawable thing in the world. A sprite either sits at a fixed position
/// or follows a physics body owned by the host registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    pub texture_key: String,
    pub position: [f32; 2],
    pub scale: [f32; 2],
    pub body: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub sprites: Vec<Sprite>,
}

/// Lifecycle of one requested texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextureSlot {
    /// Request queued under this request id; answer not seen yet.
    Pending(u32),
    /// Host-assigned texture id.
    Ready(u32),
    Failed,
}

/// Everything that survives a hot reload. Body ids stay valid because the
/// physics registry lives on the host side of the boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveState {
    pub state: GameState,
    pub world: World,
    pub buttons: Vec<Button>,
    pub textures: BTreeMap<String, TextureSlot>,
    pub camera: [f32; 2],
    pub next_request_id: u32,
    pub player_body: Option<u64>,
    pub ground_body: Option<u64>,
    pub landed: bool,
    pub fullscreen: bool,
    pub bgm_started: bool,
}

struct OwnedAssetCommand {
    kind: u32,
    request_id: u32,
    path: String,
}

struct OwnedTextCommand {
    text: String,
    position: Vec2,
    font_size: f32,
    color: Vec4,
}

pub struct Game {
    host: Host,

    state: GameState,
    world: World,
    buttons: Vec<Button>,
    textures: BTreeMap<String, TextureSlot>,
    camera: [f32; 2],
    next_request_id: u32,
    player_body: Option<u64>,
    ground_body: Option<u64>,
    landed: bool,
    fullscreen: bool,
    bgm_started: bool,

    input: InputState,
    prev_action: bool,
    pending_requests: HashMap<u32, String>,

    renderables: Vec<RenderableObject>,
    asset_queue: Vec<OwnedAssetCommand>,
    asset_mirror: Vec<AssetCommand>,
    text_queue: Vec<OwnedTextCommand>,
    text_mirror: Vec<TextCommand>,
}

impl Game {
    pub fn new(host: Host) -> Self {
        let mut game = Self::from_parts(
            host,
            SaveState {
                state: GameState::MainMenu,
                world: World::default(),
                buttons: Vec::new(),
                textures: BTreeMap::new(),
                camera: [0.0, 0.0],
                next_request_id: 1,
                player_body: None,
                ground_body: None,
                landed: false,
                fullscreen: false,
                bgm_started: false,
            },
        );
        game.enter_main_menu();
        game
    }

    fn from_parts(host: Host, save: SaveState) -> Self {
        Self {
            host,
            state: save.state,
            world: save.world,
            buttons: save.buttons,
            textures: save.textures,
            camera: save.camera,
            next_request_id: save.next_request_id,
            player_body: save.player_body,
            ground_body: save.ground_body,
            landed: save.landed,
            fullscreen: save.fullscreen,
            bgm_started: save.bgm_started,
            input: InputState::default(),
            prev_action: false,
            pending_requests: HashMap::new(),
            renderables: Vec::new(),
            asset_queue: Vec::new(),
            asset_mirror: Vec::new(),
            text_queue: Vec::new(),
            text_mirror: Vec::new(),
        }
    }

    /// Persistent state as a value; what serialize encodes.
    pub fn snapshot(&self) -> SaveState {
        SaveState {
            state: self.state,
            world: self.world.clone(),
            buttons: self.buttons.clone(),
            textures: self.textures.clone(),
            camera: self.camera,
            next_request_id: self.next_request_id,
            player_body: self.player_body,
            ground_body: self.ground_body,
            landed: self.landed,
            fullscreen: self.fullscreen,
            bgm_started: self.bgm_started,
        }
    }

    pub fn to_encoded(&self) -> Result<String, SaveError> {
        Ok(serde_json::to_string(&SaveEnvelope::new(self.snapshot()))?)
    }

    /// Rebuilds a game from an encoded form produced by [`to_encoded`],
    /// re-linked to a (possibly fresh) host table. The renderable buffer is
    /// rebuilt immediately so observable state matches the original at the
    /// moment of serialization.
    pub fn from_encoded(host: Host, encoded: &str) -> Result<Self, SaveError> {
        let envelope: SaveEnvelope<SaveState> = serde_json::from_str(encoded)?;
        if envelope.save_version != SAVE_SCHEMA_VERSION {
            return Err(SaveError::VersionMismatch {
                found: envelope.save_version,
                expected: SAVE_SCHEMA_VERSION,
            });
        }
        let mut game = Self::from_parts(host, envelope.payload);
        game.build_renderables();
        Ok(game)
    }

    #[inline]
    pub fn set_input(&mut self, input: InputState) {
        self.input = input;
    }

    /// One frame of game logic; the body of the module's advance entry
    /// point. Host callbacks (physics step, audio) all happen in here.
    pub fn advance(&mut self) {
        let input = self.input;

        if !self.bgm_started {
            self.host.play_bgm(MENU_BGM, true);
            self.bgm_started = true;
        }

        let action_edge = input.action && !self.prev_action;
        self.prev_action = input.action;

        match self.state {
            GameState::MainMenu => {
                self.queue_text(
                    "KAGURA".to_string(),
                    Vec2::new(360.0, 80.0),
                    48.0,
                    TITLE_COLOR,
                );
                ui::ui_system(self, &input);
                if action_edge && self.state == GameState::MainMenu {
                    self.toggle_fullscreen();
                }
            }
            GameState::InGame => self.update_in_game(&input, action_edge),
        }

        self.build_renderables();
    }

    fn enter_main_menu(&mut self) {
        self.buttons = vec![Button {
            rect: Rect {
                x: 300.0,
                y: 250.0,
                width: 200.0,
                height: 60.0,
            },
            text: "Start".to_string(),
            action: ButtonAction::StartGame,
        }];
        self.world.sprites.push(Sprite {
            texture_key: TITLE_TEXTURE.to_string(),
            position: [400.0, 120.0],
            scale: [256.0, 64.0],
            body: None,
        });
        self.request_texture(TITLE_TEXTURE);
    }

    /// Menu → game transition: clear the menu, create the physics bodies
    /// through the host registry and request the stage textures.
    pub(crate) fn start_game(&mut self) {
        self.host.play_sound(CLICK_SOUND);
        self.host.play_bgm(STAGE_BGM, true);
        // Duck the music under the gameplay effects.
        self.host.set_audio_settings(1.0, 0.6, 1.0);

        self.buttons.clear();
        self.world.sprites.clear();
        self.camera = [0.0, 0.0];
        self.landed = false;

        let ground = self.host.create_static_box(0.0, 0.0, 10.0, 1.0);
        let player = self.host.create_dynamic_box(0.0, 10.0, 1.0, 1.0);
        self.ground_body = Some(ground);
        self.player_body = Some(player);

        self.world.sprites.push(Sprite {
            texture_key: GROUND_TEXTURE.to_string(),
            position: [0.0, 0.0],
            scale: [10.0, 1.0],
            body: Some(ground),
        });
        self.world.sprites.push(Sprite {
            texture_key: PLAYER_TEXTURE.to_string(),
            position: [0.0, 10.0],
            scale: [1.0, 1.0],
            body: Some(player),
        });
        self.request_texture(GROUND_TEXTURE);
        self.request_texture(PLAYER_TEXTURE);

        self.state = GameState::InGame;
        self.host.log_info("game started");
    }

    fn update_in_game(&mut self, input: &InputState, action_edge: bool) {
        self.host.step_physics();

        if !self.landed {
            if let (Some(player), Some(ground)) = (self.player_body, self.ground_body) {
                let events = self.host.collision_events();
                let touched = events.iter().any(|ev| {
                    (ev.body_a == player && ev.body_b == ground)
                        || (ev.body_a == ground && ev.body_b == player)
                });
                if touched {
                    self.landed = true;
                    self.host.play_sound(LAND_SOUND);
                }
            }
        }

        if input.left {
            self.camera[0] -= CAMERA_SPEED;
        }
        if input.right {
            self.camera[0] += CAMERA_SPEED;
        }
        if input.up {
            self.camera[1] += CAMERA_SPEED;
        }
        if input.down {
            self.camera[1] -= CAMERA_SPEED;
        }

        if action_edge {
            self.save_to_disk();
        }

        if let Some(player) = self.player_body {
            let p = self.host.body_position(player);
            self.queue_text(
                format!("player y: {:.2}", p.y),
                Vec2::new(8.0, 16.0),
                16.0,
                HUD_COLOR,
            );
        }
        if self.landed {
            self.queue_text("landed".to_string(), Vec2::new(8.0, 36.0), 16.0, HUD_COLOR);
        }
    }

    fn toggle_fullscreen(&mut self) {
        self.fullscreen = !self.fullscreen;
        crate::exports::submit_fullscreen_request(self.fullscreen);
        self.host
            .log_info(if self.fullscreen { "fullscreen requested" } else { "windowed requested" });
    }

    fn save_to_disk(&self) {
        self.host.play_sound(CLICK_SOUND);
        if let Err(e) = crate::save::save_to_path(Path::new(SAVE_PATH), &self.snapshot()) {
            self.host.log_warn(&format!("save failed: {e}"));
        } else {
            self.host.log_info("game saved");
        }
    }

    fn request_texture(&mut self, path: &str) {
        if self.textures.contains_key(path) {
            return;
        }
        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.textures
            .insert(path.to_string(), TextureSlot::Pending(request_id));
        self.pending_requests.insert(request_id, path.to_string());
        self.asset_queue.push(OwnedAssetCommand {
            kind: ASSET_CMD_LOAD_TEXTURE,
            request_id,
            path: path.to_string(),
        });
    }

    /// Host answer to one asset request. A failure sentinel marks the slot
    /// failed rather than leaving it pending forever.
    pub fn notify_asset_loaded(&mut self, request_id: u32, asset_id: u32) {
        let Some(path) = self.pending_requests.remove(&request_id) else {
            self.host
                .log_warn(&format!("asset answer for unknown request {request_id}"));
            return;
        };
        let slot = if asset_id == INVALID_ASSET_ID {
            self.host.log_warn(&format!("asset load failed: '{path}'"));
            TextureSlot::Failed
        } else {
            TextureSlot::Ready(asset_id)
        };
        self.textures.insert(path, slot);
    }

    fn build_renderables(&mut self) {
        self.renderables.clear();
        for sprite in &self.world.sprites {
            let [mut x, mut y] = sprite.position;
            if let Some(body) = sprite.body {
                let p = self.host.body_position(body);
                x = p.x;
                y = p.y;
            }
            let texture_id = match self.textures.get(&sprite.texture_key) {
                Some(TextureSlot::Ready(id)) => *id,
                _ => INVALID_ASSET_ID,
            };
            self.renderables.push(RenderableObject {
                transform: Transform {
                    position: Vec3 {
                        x: x - self.camera[0],
                        y: y - self.camera[1],
                        z: 0.0,
                    },
                    rotation: Vec3::default(),
                    scale: Vec3 {
                        x: sprite.scale[0],
                        y: sprite.scale[1],
                        z: 1.0,
                    },
                },
                mesh_id: QUAD_MESH_ID,
                material_id: SPRITE_MATERIAL_ID,
                texture_id,
            });
        }
    }

    pub(crate) fn queue_text(&mut self, text: String, position: Vec2, font_size: f32, color: Vec4) {
        self.text_queue.push(OwnedTextCommand {
            text,
            position,
            font_size,
            color,
        });
    }

    #[inline]
    pub fn renderables(&self) -> &[RenderableObject] {
        &self.renderables
    }

    /// POD view of the queued asset commands; the backing strings stay put
    /// until the queue is cleared.
    pub fn asset_commands(&mut self) -> &[AssetCommand] {
        self.asset_mirror.clear();
        self.asset_mirror.extend(self.asset_queue.iter().map(|c| AssetCommand {
            kind: c.kind,
            request_id: c.request_id,
            path: RawStr::from_str(&c.path),
        }));
        &self.asset_mirror
    }

    pub fn clear_asset_commands(&mut self) {
        self.asset_queue.clear();
        self.asset_mirror.clear();
    }

    pub fn text_commands(&mut self) -> &[TextCommand] {
        self.text_mirror.clear();
        self.text_mirror.extend(self.text_queue.iter().map(|c| TextCommand {
            position: c.position,
            color: c.color,
            font_size: c.font_size,
            text: RawStr::from_str(&c.text),
        }));
        &self.text_mirror
    }

    pub fn clear_text_commands(&mut self) {
        self.text_queue.clear();
        self.text_mirror.clear();
    }

    #[inline]
    pub(crate) fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    #[inline]
    pub fn state(&self) -> GameState {
        self.state
    }

    #[inline]
    pub fn player_body(&self) -> Option<u64> {
        self.player_body
    }

    #[inline]
    pub fn ground_body(&self) -> Option<u64> {
        self.ground_body
    }

    #[inline]
    pub fn landed(&self) -> bool {
        self.landed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub_host::StubHost;

    fn click_at(x: f32, y: f32) -> InputState {
        InputState {
            mouse_pos: Vec2::new(x, y),
            mouse_clicked: true,
            ..InputState::default()
        }
    }

    #[test]
    fn menu_click_starts_game_and_creates_bodies() {
        let mut stub = StubHost::new();
        let mut game = Game::new(Host::new(stub.api()));
        assert_eq!(game.state(), GameState::MainMenu);

        game.set_input(click_at(400.0, 280.0));
        game.advance();

        assert_eq!(game.state(), GameState::InGame);
        assert_eq!(stub.static_boxes, vec![(0.0, 0.0, 10.0, 1.0)]);
        assert_eq!(stub.dynamic_boxes, vec![(0.0, 10.0, 1.0, 1.0)]);
        assert!(game.player_body().is_some());
        assert!(game.ground_body().is_some());
        assert!(stub.sounds.iter().any(|s| s.contains("click")));
        // Menu theme on the first advance, stage theme on the transition.
        assert_eq!(stub.bgm.len(), 2);
        assert_eq!(stub.settings, vec![(1.0, 0.6, 1.0)]);
    }

    #[test]
    fn click_outside_the_button_stays_in_the_menu() {
        let mut stub = StubHost::new();
        let mut game = Game::new(Host::new(stub.api()));

        game.set_input(click_at(10.0, 10.0));
        game.advance();

        assert_eq!(game.state(), GameState::MainMenu);
        assert!(stub.dynamic_boxes.is_empty());
    }

    #[test]
    fn texture_requests_use_unique_increasing_request_ids() {
        let mut stub = StubHost::new();
        let mut game = Game::new(Host::new(stub.api()));
        game.set_input(click_at(400.0, 280.0));
        game.advance();

        let ids: Vec<u32> = game.asset_commands().iter().map(|c| c.request_id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), ids.len(), "request ids must be unique");
        assert!(ids.iter().all(|&id| id >= 1));
    }

    #[test]
    fn notify_moves_slots_from_pending_to_ready() {
        let mut stub = StubHost::new();
        let mut game = Game::new(Host::new(stub.api()));

        let (request_id, path) = {
            let commands = game.asset_commands();
            assert_eq!(commands.len(), 1);
            let c = &commands[0];
            (c.request_id, unsafe { c.path.as_str() }.to_string())
        };
        assert_eq!(path, TITLE_TEXTURE);

        game.notify_asset_loaded(request_id, 7);
        game.clear_asset_commands();

        assert!(game.asset_commands().is_empty());
        let encoded = game.to_encoded().unwrap();
        assert!(encoded.contains("Ready"));
        assert!(!encoded.contains("Pending"));
    }

    #[test]
    fn failed_asset_answer_marks_the_slot_failed() {
        let mut stub = StubHost::new();
        let mut game = Game::new(Host::new(stub.api()));
        let request_id = game.asset_commands()[0].request_id;

        game.notify_asset_loaded(request_id, INVALID_ASSET_ID);
        let encoded = game.to_encoded().unwrap();
        assert!(encoded.contains("Failed"));
    }

    #[test]
    fn landing_fires_once_per_session() {
        let mut stub = StubHost::new();
        let mut game = Game::new(Host::new(stub.api()));
        game.set_input(click_at(400.0, 280.0));
        game.advance();

        let player = game.player_body().unwrap();
        let ground = game.ground_body().unwrap();
        stub.events = vec![kagura_module_api::CollisionEvent {
            body_a: player,
            body_b: ground,
        }];

        game.set_input(InputState::default());
        game.advance();
        assert!(game.landed());
        let land_sounds = stub.sounds.iter().filter(|s| s.contains("land")).count();

        game.advance();
        assert_eq!(
            stub.sounds.iter().filter(|s| s.contains("land")).count(),
            land_sounds,
            "landing sound must not repeat"
        );
    }

    #[test]
    fn encoded_state_round_trips_identically() {
        let mut stub = StubHost::new();
        let mut game = Game::new(Host::new(stub.api()));
        game.set_input(click_at(400.0, 280.0));
        game.advance();
        game.set_input(InputState::default());
        game.advance();
        game.advance();

        let encoded = game.to_encoded().unwrap();
        // Same host registry: body ids stay resolvable, as after a reload.
        let restored = Game::from_encoded(Host::new(stub.api()), &encoded).unwrap();

        assert_eq!(restored.snapshot(), game.snapshot());
        assert_eq!(restored.renderables(), game.renderables());
        assert_eq!(restored.to_encoded().unwrap(), encoded);
    }

    #[test]
    fn foreign_schema_version_is_rejected() {
        let mut stub = StubHost::new();
        let game = Game::new(Host::new(stub.api()));
        let encoded = game.to_encoded().unwrap();
        let bumped = encoded.replacen(
            &format!("\"save_version\":{SAVE_SCHEMA_VERSION}"),
            &format!("\"save_version\":{}", SAVE_SCHEMA_VERSION + 1),
            1,
        );

        assert!(matches!(
            Game::from_encoded(Host::new(stub.api()), &bumped),
            Err(SaveError::VersionMismatch { .. })
        ));
    }
}
