use serde::{Deserialize, Serialize};

/// Уникальный идентификатор предмета в комнате
pub type ItemId = String;

/// Физический размер предмета без учёта масштаба (метры)
///
/// `width` вдоль локальной оси X, `depth` вдоль Z, `height` вдоль Y.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub width: f64,
    pub depth: f64,
    pub height: f64,
}

impl Footprint {
    pub fn new(width: f64, depth: f64, height: f64) -> Self {
        Self {
            width,
            depth,
            height,
        }
    }

    /// Куб 1×1×1
    pub fn unit() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }
}

/// Трансформация предмета
///
/// `rotation`: углы Эйлера в радианах `[x, y, z]`, применяются в порядке Y-X-Z
/// (сначала рыскание вокруг вертикали). Ограничения используют только `rotation[1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: [f64; 3],
    pub rotation: [f64; 3],
    pub scale: [f64; 3],
}

impl Transform {
    pub fn new() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0],
            scale: [1.0, 1.0, 1.0],
        }
    }

    /// Единичная трансформация в заданной точке
    pub fn at(position: [f64; 3]) -> Self {
        Self {
            position,
            ..Self::new()
        }
    }

    /// Поворот вокруг вертикальной оси (радианы)
    pub fn yaw(&self) -> f64 {
        self.rotation[1]
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

/// Стена комнаты
///
/// West/East перпендикулярны оси X, North/South перпендикулярны оси Z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WallSide {
    West,
    East,
    North,
    South,
}

impl WallSide {
    /// Все стены
    pub fn all() -> &'static [WallSide] {
        &[
            WallSide::West,
            WallSide::East,
            WallSide::North,
            WallSide::South,
        ]
    }
}

/// Локальная ось модели
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    #[serde(rename = "+x")]
    PosX,
    #[serde(rename = "-x")]
    NegX,
    #[serde(rename = "+y")]
    PosY,
    #[serde(rename = "-y")]
    NegY,
    #[serde(rename = "+z")]
    PosZ,
    #[serde(rename = "-z")]
    NegZ,
}

impl Axis {
    /// Единичный вектор оси
    pub fn to_array(self) -> [f64; 3] {
        match self {
            Axis::PosX => [1.0, 0.0, 0.0],
            Axis::NegX => [-1.0, 0.0, 0.0],
            Axis::PosY => [0.0, 1.0, 0.0],
            Axis::NegY => [0.0, -1.0, 0.0],
            Axis::PosZ => [0.0, 0.0, 1.0],
            Axis::NegZ => [0.0, 0.0, -1.0],
        }
    }
}

fn default_front_axis() -> Axis {
    Axis::NegZ
}

fn default_up_axis() -> Axis {
    Axis::PosY
}

/// Крепление к стене
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallMount {
    pub side: WallSide,
    /// Координата вдоль стены (мировая X для North/South, мировая Z для West/East)
    pub u: f64,
    /// Высота нижней грани предмета над полом
    pub height: f64,
    /// Дополнительный отступ от стены внутрь комнаты
    #[serde(default)]
    pub offset: f64,
    /// Ось модели, которая должна смотреть внутрь комнаты
    #[serde(default = "default_front_axis")]
    pub front: Axis,
    /// Ось модели, которая должна смотреть вверх
    #[serde(default = "default_up_axis")]
    pub up: Axis,
}

impl WallMount {
    /// Крепление с ориентацией модели по умолчанию (фронт −Z, верх +Y)
    pub fn new(side: WallSide, u: f64, height: f64) -> Self {
        Self {
            side,
            u,
            height,
            offset: 0.0,
            front: default_front_axis(),
            up: default_up_axis(),
        }
    }
}

/// Настройки привязки, сохранённые в момент фиксации предмета
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockedSnapSettings {
    pub grid_enabled: bool,
    pub grid_size: f64,
    pub grid_divisions: u32,
    pub rotation_snap_enabled: bool,
    pub rotation_snap_angle: f64,
}

/// Предмет, размещённый в комнате
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Уникальный идентификатор (в пределах сессии)
    pub id: ItemId,
    /// Отображаемое имя
    pub name: String,
    /// Ключ записи каталога, из которой создан предмет
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_key: Option<String>,
    pub footprint: Footprint,
    pub transform: Transform,
    /// Зафиксированные предметы не редактируются интерактивно
    #[serde(default)]
    pub locked: bool,
    /// Присутствует только у настенных предметов
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wall_mount: Option<WallMount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snap_settings: Option<LockedSnapSettings>,
}

impl Item {
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>, footprint: Footprint) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            catalog_key: None,
            footprint,
            transform: Transform::new(),
            locked: false,
            wall_mount: None,
            snap_settings: None,
        }
    }

    /// Builder: задать позицию
    pub fn with_position(mut self, position: [f64; 3]) -> Self {
        self.transform.position = position;
        self
    }

    /// Builder: задать поворот вокруг вертикали
    pub fn with_yaw(mut self, yaw: f64) -> Self {
        self.transform.rotation[1] = yaw;
        self
    }

    /// Builder: задать масштаб
    pub fn with_scale(mut self, scale: [f64; 3]) -> Self {
        self.transform.scale = scale;
        self
    }

    pub fn position(&self) -> [f64; 3] {
        self.transform.position
    }

    pub fn yaw(&self) -> f64 {
        self.transform.yaw()
    }

    pub fn is_wall_mounted(&self) -> bool {
        self.wall_mount.is_some()
    }

    /// Размер с учётом масштаба `[width, height, depth]` по осям X/Y/Z
    pub fn scaled_size(&self) -> [f64; 3] {
        let s = self.transform.scale;
        [
            self.footprint.width * s[0],
            self.footprint.height * s[1],
            self.footprint.depth * s[2],
        ]
    }
}

// ============================================================================
// Комната
// ============================================================================

/// Логические размеры комнаты (метры)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoomDimensions {
    /// Вдоль оси X
    pub width: f64,
    /// Вдоль оси Z
    pub depth: f64,
    /// Вдоль оси Y
    pub height: f64,
    pub wall_thickness: f64,
    /// Минимальный зазор между предметом и стеной/потолком
    pub margin: f64,
}

impl Default for RoomDimensions {
    fn default() -> Self {
        Self {
            width: 10.0,
            depth: 10.0,
            height: 5.0,
            wall_thickness: 0.3,
            margin: 0.3,
        }
    }
}

impl RoomDimensions {
    /// Слить частичное обновление с текущими размерами
    pub fn merged(&self, update: &RoomDimensionsUpdate) -> Self {
        Self {
            width: update.width.unwrap_or(self.width),
            depth: update.depth.unwrap_or(self.depth),
            height: update.height.unwrap_or(self.height),
            wall_thickness: update.wall_thickness.unwrap_or(self.wall_thickness),
            margin: update.margin.unwrap_or(self.margin),
        }
    }
}

/// Частичное обновление размеров комнаты
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomDimensionsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wall_thickness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<f64>,
}

// ============================================================================
// Сжатое представление и сохранённые раскладки
// ============================================================================

/// Сжатая запись предмета: только идентификатор, трансформация и фиксация
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressedItem {
    pub id: ItemId,
    pub pos: [f64; 3],
    pub rot: [f64; 3],
    pub scl: [f64; 3],
    pub locked: bool,
}

/// Сжатый снимок всего списка предметов
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressedSnapshot {
    pub items: Vec<CompressedItem>,
    /// Миллисекунды с начала эпохи Unix
    pub timestamp: u64,
    pub description: String,
}

/// Метаданные сохранённой раскладки
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutMetadata {
    pub id: String,
    pub name: String,
    /// Миллисекунды с начала эпохи Unix
    pub timestamp: u64,
    pub item_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Сохранённая раскладка: метаданные + сжатый снимок
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedLayout {
    pub metadata: LayoutMetadata,
    pub data: CompressedSnapshot,
}
