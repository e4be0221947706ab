use std::path::Path;

use anyhow::Context;

macro_rules! game_cfg {
    (
        $( $section_name:ident : $section_ty:ident {
            $( $field_name:ident : $field_ty:ty ),+ $(,)?
        } ),+
        $(,)?
    ) => {
        #[derive(Debug, Clone, Copy, Default, PartialEq, serde::Deserialize, serde::Serialize)]
        pub struct GameCfg {
            $( #[serde(default)] pub $section_name : sections::$section_ty ),+
        }

        impl GameCfg {
            /// Sets one field from its RON text.
            pub fn set_field(&mut self, section: &str, field: &str, val: &str) -> anyhow::Result<()> {
                match section {
                    $(stringify!($section_name) => match field {
                        $(stringify!($field_name) => self.$section_name.$field_name = ron::from_str(val)
                            .with_context(|| format!("bad value for {section}.{field}: {val:?}"))?,)+
                        _ => anyhow::bail!("unknown field in section {section:?}: {field:?}"),
                    })+
                    _ => anyhow::bail!("unknown section: {section:?}"),
                };
                Ok(())
            }

            /// Reads one field as RON text.
            pub fn get_field(&self, section: &str, field: &str) -> anyhow::Result<String> {
                let val = match section {
                    $(stringify!($section_name) => match field {
                        $(stringify!($field_name) => ron::to_string(&self.$section_name.$field_name)?,)+
                        _ => anyhow::bail!("unknown field in section {section:?}: {field:?}"),
                    })+
                    _ => anyhow::bail!("unknown section: {section:?}"),
                };
                Ok(val)
            }

            /// Every `(section, field)` pair, in declaration order.
            pub fn field_names() -> &'static [(&'static str, &'static str)] {
                &[$($((stringify!($section_name), stringify!($field_name)),)+)*]
            }
        }

        pub mod sections {
            $(
                #[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize, serde::Serialize)]
                #[serde(default)]
                pub struct $section_ty {
                    $( pub $field_name : $field_ty ),+
                }
            )+
        }
    };
}

game_cfg! {
    map: Map {
        tile_width: i32,
        tile_height: i32,
        projection: lib_field::Projection,
    },
    movement: Movement {
        speed: f32,
        vague_scale: f32,
        free_direction: bool,
        delay: f32,
    },
    camera: Camera {
        view_width: f32,
        view_height: f32,
        scroll_step: f32,
    },
    collision: Collision {
        enabled: bool,
        cell_size: f32,
    },
    render: Render {
        tint: crate::Tint,
    },
    pathing: Pathing {
        heuristic: lib_path::Heuristic,
    },
}

impl Default for sections::Map {
    fn default() -> Self {
        sections::Map {
            tile_width: 32,
            tile_height: 32,
            projection: lib_field::Projection::Orthogonal,
        }
    }
}

impl Default for sections::Movement {
    fn default() -> Self {
        sections::Movement {
            speed: 2.0,
            vague_scale: 1.0,
            free_direction: false,
            delay: 0.0,
        }
    }
}

impl Default for sections::Camera {
    fn default() -> Self {
        sections::Camera {
            view_width: 640.0,
            view_height: 480.0,
            scroll_step: crate::DEFAULT_SCROLL_STEP,
        }
    }
}

impl Default for sections::Collision {
    fn default() -> Self {
        sections::Collision {
            enabled: false,
            cell_size: lib_col::DEFAULT_CELL_SIZE,
        }
    }
}

impl Default for sections::Render {
    fn default() -> Self {
        sections::Render {
            tint: crate::Tint::WHITE,
        }
    }
}

impl Default for sections::Pathing {
    fn default() -> Self {
        sections::Pathing {
            heuristic: lib_path::Heuristic::Manhattan,
        }
    }
}

impl GameCfg {
    pub fn from_ron(text: &str) -> anyhow::Result<GameCfg> {
        ron::from_str(text).context("parsing game config")
    }

    pub fn to_ron(&self) -> anyhow::Result<String> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<GameCfg> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        GameCfg::from_ron(&text).with_context(|| format!("in {}", path.display()))
    }

    pub fn view_size(&self) -> glam::Vec2 {
        glam::vec2(self.camera.view_width, self.camera.view_height)
    }
}
