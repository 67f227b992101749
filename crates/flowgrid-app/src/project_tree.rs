//! The concrete FlowGrid project tree: the windows, fields, and containers
//! that make up a session, built once at startup and again (identically)
//! whenever a snapshot is decoded.
//!
//! This is the one piece of the core that actually knows what FlowGrid the
//! application looks like; every other crate is generic over "some
//! component tree". Keeping it in its own module means `Session::new` and a
//! freshly-decoded snapshot's resolver agree on topology by construction
//! rather than by convention.

use flowgrid_component::{AdjacencyList, Field, FieldKind, Matrix, NavigableStack, TextBuffer, Vec2, Vector2D, Window};
use flowgrid_primitive::{Primitive, PrimitiveKind};
use flowgrid_store::Store;

use crate::registry::AppRegistry;

/// A window's fields, grouped so callers don't have to remember each
/// window's child path segments.
pub struct MixerWindow {
    pub window: Window,
    pub gain: Field,
    pub mute: Field,
    pub position: Vec2,
}

pub struct DeviceSettingsWindow {
    pub window: Window,
    pub device_name: Field,
    pub sample_rate: Field,
    pub channels: Field,
    pub state: Field,
}

pub struct EditorWindow {
    pub window: Window,
    pub source: TextBuffer,
    pub compile_status: Field,
    pub compile_message: Field,
}

/// The full set of live component handles for a session. `Session` reads
/// and writes through these rather than re-resolving paths at runtime.
pub struct AppTree {
    pub font_scale: Field,
    pub mixer: MixerWindow,
    pub device_settings: DeviceSettingsWindow,
    pub editor: EditorWindow,
    pub graph: AdjacencyList,
    pub nodes: NavigableStack,
    pub routing: Matrix,
    pub node_params: Vector2D,
    pub error_message: Field,
}

/// Audio device lifecycle states, named for `device_settings.state`'s enum
/// table.
pub const DEVICE_STATE_NAMES: [&str; 4] = ["Stopped", "Starting", "Running", "Error"];

/// DSP compile outcomes, named for `editor.compile_status`'s enum table.
pub const COMPILE_STATUS_NAMES: [&str; 3] = ["Idle", "Success", "Failure"];

/// Builds the tree under `registry`'s topology/dispatch registries, writing
/// default values into `store`. Requires an open transient; the caller
/// commits once construction finishes, same as any other batch of writes.
pub fn construct(registry: &mut AppRegistry, store: &mut Store) -> AppTree {
    let root = registry.tree.register_root("FlowGrid");

    let font_scale = field(registry, store, root, "font_scale", "Font Scale", FieldKind::Float, Primitive::Float(1.0));

    let windows = registry.tree.register(root, "windows", "Windows", flowgrid_component::ComponentKind::Group);

    let mixer_win = Window::construct(&mut registry.tree, store, windows, "mixer", "Mixer", true);
    registry.targets.register(mixer_win.id, mixer_win.clone());
    registry.note_window(mixer_win.id);
    let gain = field(registry, store, mixer_win.id, "gain", "Gain", FieldKind::Float, Primitive::Float(0.8));
    let mute = field(registry, store, mixer_win.id, "mute", "Mute", FieldKind::Bool, Primitive::Bool(false));
    let position = Vec2::construct(&mut registry.tree, store, mixer_win.id, "position", "Position");
    registry.targets.register(position.id, position.clone());
    registry.note_vec2(position.id);
    let mixer = MixerWindow { window: mixer_win, gain, mute, position };

    let device_win = Window::construct(&mut registry.tree, store, windows, "device_settings", "Device Settings", false);
    registry.targets.register(device_win.id, device_win.clone());
    registry.note_window(device_win.id);
    let device_name =
        field(registry, store, device_win.id, "device_name", "Device Name", FieldKind::StringField, Primitive::String(String::new()));
    let sample_rate =
        field(registry, store, device_win.id, "sample_rate", "Sample Rate", FieldKind::UInt, Primitive::UInt(48_000));
    let channels = field(registry, store, device_win.id, "channels", "Channels", FieldKind::UInt, Primitive::UInt(2));
    let mut state = field(registry, store, device_win.id, "state", "State", FieldKind::Enum, Primitive::Int(0));
    state.names = DEVICE_STATE_NAMES.iter().map(|s| (*s).to_string()).collect();
    let device_settings = DeviceSettingsWindow { window: device_win, device_name, sample_rate, channels, state };

    let editor_win = Window::construct(&mut registry.tree, store, windows, "editor", "Editor", false);
    registry.targets.register(editor_win.id, editor_win.clone());
    registry.note_window(editor_win.id);
    let source = TextBuffer::construct(&mut registry.tree, store, editor_win.id, "source", "Source");
    registry.targets.register(source.id, source.clone());
    registry.note_text_buffer(source.id);
    let mut compile_status =
        field(registry, store, editor_win.id, "compile_status", "Compile Status", FieldKind::Enum, Primitive::Int(0));
    compile_status.names = COMPILE_STATUS_NAMES.iter().map(|s| (*s).to_string()).collect();
    let compile_message = field(
        registry,
        store,
        editor_win.id,
        "compile_message",
        "Compile Message",
        FieldKind::StringField,
        Primitive::String(String::new()),
    );
    let editor = EditorWindow { window: editor_win, source, compile_status, compile_message };

    let audio = registry.tree.register(root, "audio", "Audio", flowgrid_component::ComponentKind::Group);
    let graph = AdjacencyList::construct(&mut registry.tree, store, audio, "graph", "Graph");
    registry.targets.register(graph.id, graph.clone());
    let nodes = NavigableStack::construct(&mut registry.tree, store, audio, "nodes", "Nodes", PrimitiveKind::String);
    registry.targets.register(nodes.id, nodes.clone());
    registry.note_navigable_stack(nodes.id, PrimitiveKind::String);

    let routing =
        Matrix::construct(&mut registry.tree, store, audio, "routing", "Routing", 8, 8, PrimitiveKind::Bool, Primitive::Bool(false));
    registry.targets.register(routing.id, routing.clone());
    registry.note_matrix(routing.id, PrimitiveKind::Bool);

    let node_params = Vector2D::construct(&mut registry.tree, store, audio, "node_params", "Node Params", PrimitiveKind::Float);
    registry.targets.register(node_params.id, node_params.clone());
    registry.note_vector2d(node_params.id, PrimitiveKind::Float);

    let error_message =
        field(registry, store, root, "error_message", "Error Message", FieldKind::StringField, Primitive::String(String::new()));

    AppTree { font_scale, mixer, device_settings, editor, graph, nodes, routing, node_params, error_message }
}

impl AppTree {
    /// Re-reads every field's cached value from `store`. Called by the
    /// session after any commit or history navigation, since the set of
    /// fields is small enough that refreshing all of them is cheaper than
    /// tracking exactly which ones a given patch touched.
    pub fn refresh_all(&mut self, store: &Store) {
        self.font_scale.refresh(store);
        self.mixer.gain.refresh(store);
        self.mixer.mute.refresh(store);
        self.device_settings.device_name.refresh(store);
        self.device_settings.sample_rate.refresh(store);
        self.device_settings.channels.refresh(store);
        self.device_settings.state.refresh(store);
        self.editor.compile_status.refresh(store);
        self.editor.compile_message.refresh(store);
        self.error_message.refresh(store);
    }
}

fn field(
    registry: &mut AppRegistry,
    store: &mut Store,
    parent: flowgrid_path::Id,
    path_segment: &str,
    name: &str,
    kind: FieldKind,
    default: Primitive,
) -> Field {
    let field = Field::construct(&mut registry.tree, store, parent, path_segment, name, kind, default);
    registry.targets.register(field.id, field.clone());
    registry.note_field(field.id, field.cached().kind());
    field
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowgrid_path::Path;

    #[test]
    fn construct_populates_expected_paths() {
        let mut registry = AppRegistry::new();
        let mut store = Store::new();
        store.begin_transient();
        let app = construct(&mut registry, &mut store);
        store.commit();

        assert_eq!(app.font_scale.as_f32().unwrap(), 1.0);
        assert!(app.mixer.window.is_visible(&store));
        assert!(!app.device_settings.window.is_visible(&store));
        assert_eq!(app.device_settings.sample_rate.as_u32().unwrap(), 48_000);
        assert_eq!(app.editor.source.text(&store), "");
        assert_eq!(registry.tree.id_at(&Path::from("/windows/mixer/gain")), Some(app.mixer.gain.id));
    }

    #[test]
    fn nodes_routing_and_node_params_are_registered_with_dispatch() {
        use flowgrid_action::{Action, MatrixAction, NavigableStackAction, Vector2DAction};
        use flowgrid_component::ApplyOutcome;

        let mut registry = AppRegistry::new();
        let mut store = Store::new();
        store.begin_transient();
        let app = construct(&mut registry, &mut store);
        store.commit();

        store.begin_transient();
        let push = Action::NavigableStack(NavigableStackAction::Push {
            path: app.nodes.path.clone(),
            value: Primitive::String("osc1".into()),
        });
        assert_eq!(flowgrid_component::dispatch::apply(&registry.targets, &registry.tree, &mut store, &push), ApplyOutcome::Applied);
        assert_eq!(app.nodes.current_index(&store), Some(0));

        let set_routing = Action::Matrix(MatrixAction::SetValue { path: app.routing.path.clone(), row: 0, col: 1, value: Primitive::Bool(true) });
        assert_eq!(
            flowgrid_component::dispatch::apply(&registry.targets, &registry.tree, &mut store, &set_routing),
            ApplyOutcome::Applied
        );
        assert_eq!(app.routing.get(&store, 0, 1).unwrap(), Primitive::Bool(true));

        let insert_row = Action::Vector2D(Vector2DAction::InsertRow {
            path: app.node_params.path.clone(),
            index: 0,
            values: vec![Primitive::Float(0.5), Primitive::Float(1.0)],
        });
        assert_eq!(
            flowgrid_component::dispatch::apply(&registry.targets, &registry.tree, &mut store, &insert_row),
            ApplyOutcome::Applied
        );
        assert_eq!(app.node_params.row_len(&store, 0), 2);
        store.commit();
    }

    #[test]
    fn enum_name_tables_are_wired() {
        let mut registry = AppRegistry::new();
        let mut store = Store::new();
        store.begin_transient();
        let app = construct(&mut registry, &mut store);
        store.commit();
        assert_eq!(app.device_settings.state.enum_name().unwrap(), "Stopped");
        assert_eq!(app.editor.compile_status.enum_name().unwrap(), "Idle");
    }
}
