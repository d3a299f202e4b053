//! Headless navigation: layers, navigation stacks and embedding.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::error::NavigationError;
use super::registry::{Registry, ScreenId};
use super::route::ScreenRoute;
use crate::dispatcher::Dispatcher;
use crate::router::{Animation, LiveScreen, PendingScreen, RouteSurface};
use crate::screen::{Screen, ScreenLaunch};
use crate::store::InputHandle;

/// Owns every live screen and arranges them the way a window would.
///
/// Screens sit in presentation layers. Layer 0 holds the root; each
/// `present` opens a layer above. A layer flagged as navigation is a stack
/// that `show` pushes onto and `pop` shrinks. Any screen can host embedded
/// children in named containers; those live and die with their host.
///
/// Screens route through a [`ScreenRoute`], which only holds a weak
/// reference back here.
pub struct Navigator {
    dispatcher: Rc<Dispatcher>,
    weak_self: Weak<Navigator>,
    state: RefCell<NavState>,
}

#[derive(Default)]
struct NavState {
    registry: Registry,
    layers: Vec<Layer>,
}

struct Layer {
    navigation: bool,
    screens: Vec<ScreenId>,
}

/// Snapshot of one presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerInfo {
    pub navigation: bool,
    pub screens: Vec<ScreenId>,
}

type Removed = Vec<Box<dyn LiveScreen>>;

impl NavState {
    fn name(&self, id: ScreenId) -> &'static str {
        self.registry.get(id).map(|e| e.name).unwrap_or("<gone>")
    }

    /// The top-level screen `id` is (transitively) embedded in, or `id`.
    fn host_of(&self, id: ScreenId) -> Result<ScreenId, NavigationError> {
        let mut current = id;
        loop {
            let entry = self
                .registry
                .get(current)
                .ok_or(NavigationError::ScreenGone(id))?;
            match entry.embedded_in {
                Some(parent) => current = parent,
                None => return Ok(current),
            }
        }
    }

    /// Layer index and stack position of the screen hosting `id`.
    fn position(&self, id: ScreenId) -> Result<(usize, usize), NavigationError> {
        let host = self.host_of(id)?;
        self.layers
            .iter()
            .enumerate()
            .find_map(|(li, layer)| {
                layer
                    .screens
                    .iter()
                    .position(|s| *s == host)
                    .map(|pos| (li, pos))
            })
            .ok_or(NavigationError::NotPlaced {
                screen: self.name(id),
            })
    }

    fn navigation_layer(&self, id: ScreenId) -> Result<usize, NavigationError> {
        let (li, _) = self.position(id)?;
        if self.layers[li].navigation {
            Ok(li)
        } else {
            Err(NavigationError::NotInNavigationStack {
                screen: self.name(id),
            })
        }
    }

    /// Remove `id` and everything embedded in it. Returns the started
    /// screens so the caller can drop them once no borrow is held.
    fn remove_tree(&mut self, id: ScreenId, removed: &mut Removed) {
        let Some(entry) = self.registry.remove(id) else {
            return;
        };
        if let Some(parent) = entry.embedded_in.and_then(|p| self.registry.get_mut(p)) {
            parent.embedded.retain(|(_, child)| *child != id);
        }
        for (_, child) in entry.embedded {
            self.remove_tree(child, removed);
        }
        if let Some(screen) = entry.screen {
            removed.push(screen);
        }
    }

    fn truncate_layers(&mut self, keep: usize, removed: &mut Removed) {
        let dropped: Vec<Layer> = self.layers.drain(keep..).collect();
        for layer in dropped {
            for id in layer.screens {
                self.remove_tree(id, removed);
            }
        }
    }

    fn truncate_stack(&mut self, layer: usize, keep: usize, removed: &mut Removed) {
        let dropped: Vec<ScreenId> = self.layers[layer].screens.drain(keep..).collect();
        for id in dropped {
            self.remove_tree(id, removed);
        }
    }

    /// Every live screen, layer by layer, each host followed by its
    /// embedded children.
    fn ordered(&self) -> Vec<ScreenId> {
        fn visit(state: &NavState, id: ScreenId, out: &mut Vec<ScreenId>) {
            out.push(id);
            if let Some(entry) = state.registry.get(id) {
                for (_, child) in &entry.embedded {
                    visit(state, *child, out);
                }
            }
        }
        let mut out = Vec::new();
        for layer in &self.layers {
            for id in &layer.screens {
                visit(self, *id, &mut out);
            }
        }
        out
    }
}

impl Navigator {
    pub fn new(dispatcher: Rc<Dispatcher>) -> Rc<Self> {
        Rc::new_cyclic(|weak_self| Self {
            dispatcher,
            weak_self: weak_self.clone(),
            state: RefCell::new(NavState::default()),
        })
    }

    pub fn dispatcher(&self) -> &Rc<Dispatcher> {
        &self.dispatcher
    }

    /// Replace whatever is on screen with `S` as the new root.
    pub fn set_root<S: Screen>(&self, launch: ScreenLaunch<S>) -> InputHandle<S::Reducer> {
        let (screen, input) = launch.prepare(Rc::clone(&self.dispatcher));
        self.install_root(screen, Animation::None);
        input
    }

    /// Tear down every screen and start `screen` as the only one.
    pub fn install_root(&self, screen: PendingScreen, animation: Animation) -> ScreenId {
        let removed = {
            let mut state = self.state.borrow_mut();
            let mut removed = Vec::new();
            state.truncate_layers(0, &mut removed);
            removed
        };
        tracing::debug!(
            screen = screen.name(),
            ?animation,
            dropped = removed.len(),
            "installing root"
        );
        drop(removed);

        let navigation = screen.wants_navigation();
        self.mount(screen, None, |state, id| {
            state.layers.push(Layer {
                navigation,
                screens: vec![id],
            })
        })
    }

    pub fn try_replace(
        &self,
        from: ScreenId,
        screen: PendingScreen,
        animation: Animation,
    ) -> Result<ScreenId, NavigationError> {
        self.ensure_alive(from)?;
        Ok(self.install_root(screen, animation))
    }

    /// Push onto the caller's navigation stack, or present when the caller
    /// is not in one.
    pub fn try_show(
        &self,
        from: ScreenId,
        screen: PendingScreen,
    ) -> Result<ScreenId, NavigationError> {
        let (layer, _) = self.state.borrow().position(from)?;
        if !self.state.borrow().layers[layer].navigation {
            tracing::debug!(
                from = %from,
                screen = screen.name(),
                "no navigation stack, presenting"
            );
            return self.try_present(from, screen);
        }
        Ok(self.mount(screen, None, |state, id| {
            state.layers[layer].screens.push(id)
        }))
    }

    /// Open `screen` in a new layer above everything else.
    pub fn try_present(
        &self,
        from: ScreenId,
        screen: PendingScreen,
    ) -> Result<ScreenId, NavigationError> {
        self.state.borrow().position(from)?;
        let navigation = screen.wants_navigation();
        Ok(self.mount(screen, None, |state, id| {
            state.layers.push(Layer {
                navigation,
                screens: vec![id],
            })
        }))
    }

    /// Host `screen` in `container` of the caller. A screen already in that
    /// container is removed first.
    pub fn try_embed(
        &self,
        from: ScreenId,
        screen: PendingScreen,
        container: &str,
    ) -> Result<ScreenId, NavigationError> {
        let removed = {
            let mut state = self.state.borrow_mut();
            let occupant = state
                .registry
                .get(from)
                .ok_or(NavigationError::ScreenGone(from))?
                .embedded
                .iter()
                .find(|(name, _)| name == container)
                .map(|(_, id)| *id);
            let mut removed = Vec::new();
            if let Some(occupant) = occupant {
                state.remove_tree(occupant, &mut removed);
            }
            removed
        };
        drop(removed);

        let container = container.to_string();
        Ok(self.mount(screen, Some(from), move |state, id| {
            if let Some(host) = state.registry.get_mut(from) {
                host.embedded.push((container, id));
            }
        }))
    }

    /// Remove the top screen of the caller's navigation stack.
    pub fn try_pop(&self, from: ScreenId) -> Result<(), NavigationError> {
        let removed = {
            let mut state = self.state.borrow_mut();
            let layer = state.navigation_layer(from)?;
            let depth = state.layers[layer].screens.len();
            if depth <= 1 {
                return Err(NavigationError::AtRoot {
                    screen: state.name(from),
                });
            }
            let mut removed = Vec::new();
            state.truncate_stack(layer, depth - 1, &mut removed);
            removed
        };
        drop(removed);
        Ok(())
    }

    /// Remove everything above the root of the caller's navigation stack.
    pub fn try_pop_to_root(&self, from: ScreenId) -> Result<(), NavigationError> {
        let removed = {
            let mut state = self.state.borrow_mut();
            let layer = state.navigation_layer(from)?;
            let mut removed = Vec::new();
            state.truncate_stack(layer, 1, &mut removed);
            removed
        };
        drop(removed);
        Ok(())
    }

    /// Remove the caller's layer and every layer above it. From the root
    /// layer, remove only the layers above it.
    pub fn try_dismiss(&self, from: ScreenId) -> Result<(), NavigationError> {
        let removed = {
            let mut state = self.state.borrow_mut();
            let (layer, _) = state.position(from)?;
            let keep = if layer == 0 {
                if state.layers.len() == 1 {
                    return Err(NavigationError::NothingToDismiss {
                        screen: state.name(from),
                    });
                }
                1
            } else {
                layer
            };
            let mut removed = Vec::new();
            state.truncate_layers(keep, &mut removed);
            removed
        };
        drop(removed);
        Ok(())
    }

    /// Remove the caller the way it was opened: unembed an embedded screen,
    /// pop a screen pushed onto a navigation stack (with anything pushed
    /// after it), otherwise dismiss.
    pub fn try_close(&self, from: ScreenId) -> Result<(), NavigationError> {
        let removed = {
            let mut state = self.state.borrow_mut();
            let embedded = state
                .registry
                .get(from)
                .ok_or(NavigationError::ScreenGone(from))?
                .embedded_in
                .is_some();
            let mut removed = Vec::new();
            if embedded {
                state.remove_tree(from, &mut removed);
            } else {
                let (layer, pos) = state.position(from)?;
                if state.layers[layer].navigation && pos > 0 {
                    state.truncate_stack(layer, pos, &mut removed);
                } else {
                    drop(state);
                    return self.try_dismiss(from);
                }
            }
            removed
        };
        drop(removed);
        Ok(())
    }

    /// Routing surface for screen `id`.
    pub fn surface_for(&self, id: ScreenId) -> Rc<dyn RouteSurface> {
        Rc::new(ScreenRoute::new(
            self.weak_self.clone(),
            id,
            Rc::clone(&self.dispatcher),
        ))
    }

    pub fn is_alive(&self, id: ScreenId) -> bool {
        self.state.borrow().registry.contains(id)
    }

    pub fn screen_name(&self, id: ScreenId) -> Option<&'static str> {
        self.state.borrow().registry.get(id).map(|e| e.name)
    }

    /// `Debug` rendering of the screen's current state.
    pub fn state_of(&self, id: ScreenId) -> Option<String> {
        self.state
            .borrow()
            .registry
            .get(id)
            .and_then(|e| e.screen.as_ref())
            .and_then(|screen| screen.state_description())
    }

    pub fn root(&self) -> Option<ScreenId> {
        let state = self.state.borrow();
        state.layers.first().and_then(|l| l.screens.first().copied())
    }

    /// Top screen of the top layer.
    pub fn top(&self) -> Option<ScreenId> {
        let state = self.state.borrow();
        state.layers.last().and_then(|l| l.screens.last().copied())
    }

    /// First live screen named `name`, in layer order.
    pub fn find(&self, name: &str) -> Option<ScreenId> {
        let state = self.state.borrow();
        state
            .ordered()
            .into_iter()
            .find(|id| state.registry.get(*id).is_some_and(|e| e.name == name))
    }

    pub fn layers(&self) -> Vec<LayerInfo> {
        self.state
            .borrow()
            .layers
            .iter()
            .map(|l| LayerInfo {
                navigation: l.navigation,
                screens: l.screens.clone(),
            })
            .collect()
    }

    /// Screen names per layer, bottom first. Embedded screens are left out.
    pub fn layer_names(&self) -> Vec<Vec<&'static str>> {
        let state = self.state.borrow();
        state
            .layers
            .iter()
            .map(|l| l.screens.iter().map(|id| state.name(*id)).collect())
            .collect()
    }

    /// Children embedded in `id`, by container.
    pub fn embedded(&self, id: ScreenId) -> Vec<(String, ScreenId)> {
        self.state
            .borrow()
            .registry
            .get(id)
            .map(|e| e.embedded.clone())
            .unwrap_or_default()
    }

    /// Number of live screens, embedded ones included.
    pub fn len(&self) -> usize {
        self.state.borrow().registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ensure_alive(&self, id: ScreenId) -> Result<(), NavigationError> {
        if self.is_alive(id) {
            Ok(())
        } else {
            Err(NavigationError::ScreenGone(id))
        }
    }

    /// Register `screen`, place it, then start it with no borrow held so
    /// its initialization can route.
    fn mount(
        &self,
        screen: PendingScreen,
        embedded_in: Option<ScreenId>,
        place: impl FnOnce(&mut NavState, ScreenId),
    ) -> ScreenId {
        let id = {
            let mut state = self.state.borrow_mut();
            let id = state.registry.insert(screen.name(), embedded_in);
            place(&mut state, id);
            id
        };
        tracing::debug!(screen = screen.name(), id = %id, "starting screen");

        let live = screen.start(self.surface_for(id));

        let orphan = {
            let mut state = self.state.borrow_mut();
            match state.registry.get_mut(id) {
                Some(entry) => {
                    entry.screen = Some(live);
                    None
                }
                None => Some(live),
            }
        };
        if orphan.is_some() {
            tracing::debug!(id = %id, "screen removed while starting");
        }
        id
    }
}

impl fmt::Debug for Navigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigator")
            .field("layers", &self.layer_names())
            .field("screens", &self.len())
            .finish()
    }
}
