use std::fmt;

/// Role a component plays within a pipeline; drives which framework
/// component name is requested and how the FSM's specializations dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComponentRole {
    Source,
    Demuxer,
    Decoder,
    Renderer,
}

impl fmt::Display for ComponentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ComponentRole::Source => "source",
            ComponentRole::Demuxer => "demuxer",
            ComponentRole::Decoder => "decoder",
            ComponentRole::Renderer => "renderer",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for ComponentRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "source" => Ok(ComponentRole::Source),
            "demuxer" => Ok(ComponentRole::Demuxer),
            "decoder" => Ok(ComponentRole::Decoder),
            "renderer" => Ok(ComponentRole::Renderer),
            other => Err(format!("unknown component role '{other}'")),
        }
    }
}

/// One entry of a pipeline configuration: the framework component name to
/// request, and the role it plays (source is always index 0, renderer is
/// always the last index; `is_first_component`/`is_last_component` in the ops
/// layer rely on this ordering).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentSpec {
    pub name: String,
    pub role: ComponentRole,
}

impl ComponentSpec {
    pub fn new(name: impl Into<String>, role: ComponentRole) -> Self {
        ComponentSpec {
            name: name.into(),
            role,
        }
    }
}

/// Selects which `GraphStrategy` builds the pipeline: a plain local file
/// graph, or one fronted by a named streaming service resolver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GraphKind {
    LocalFile,
    Streaming { service: String },
}

impl fmt::Display for GraphKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphKind::LocalFile => write!(f, "local"),
            GraphKind::Streaming { service } => write!(f, "streaming:{service}"),
        }
    }
}

/// Concrete, ordered list of components to instantiate for a run, derived
/// from a `GraphKind` by a `GraphStrategy::pipeline_factory`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    pub components: Vec<ComponentSpec>,
}

impl PipelineConfig {
    pub fn new(components: Vec<ComponentSpec>) -> Self {
        PipelineConfig { components }
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Number of tunnels in this pipeline: one between each adjacent pair of
    /// components.
    pub fn tunnel_count(&self) -> usize {
        self.components.len().saturating_sub(1)
    }
}
