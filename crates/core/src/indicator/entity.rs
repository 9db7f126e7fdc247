/// # Summary
/// 技术指标计算结果。各数组与源 K 线序列按下标对齐（等长，
/// 同下标对应同一时间戳），暖机期不足的位置以 `f64::NAN` 占位。
///
/// # Invariants
/// - 含 NaN 哨兵值，故有意不派生 Serialize（JSON 无法表示 NaN）；
///   跨会话复用由调用方在内存中记忆化完成。
#[derive(Debug, Clone)]
pub enum IndicatorResult {
    // 简单移动平均
    Ma { period: usize, values: Vec<f64> },
    // 指数移动平均
    Ema { period: usize, values: Vec<f64> },
    // 布林带
    Boll {
        upper: Vec<f64>,
        middle: Vec<f64>,
        lower: Vec<f64>,
    },
    // 相对强弱指标 (Wilder 平滑)
    Rsi { period: usize, values: Vec<f64> },
    // 指数平滑异同平均线
    Macd {
        dif: Vec<f64>,
        dea: Vec<f64>,
        macd: Vec<f64>,
    },
}

impl IndicatorResult {
    /// 结果序列长度（与源 K 线等长）
    pub fn len(&self) -> usize {
        match self {
            IndicatorResult::Ma { values, .. }
            | IndicatorResult::Ema { values, .. }
            | IndicatorResult::Rsi { values, .. } => values.len(),
            IndicatorResult::Boll { middle, .. } => middle.len(),
            IndicatorResult::Macd { dif, .. } => dif.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// # Summary
/// 指标类别：主图叠加 (Overlay) 或副图振荡器 (Oscillator)。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorKind {
    // 主图叠加（均线、布林带）
    Overlay,
    // 副图振荡器（RSI、MACD）
    Oscillator,
}
