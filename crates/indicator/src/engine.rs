use kanpan_core::indicator::error::IndicatorError;
use kanpan_core::market::entity::Candle;

/// 布林带三轨
#[derive(Debug, Clone)]
pub struct BollBands {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

/// MACD 三序列
#[derive(Debug, Clone)]
pub struct MacdSeries {
    pub dif: Vec<f64>,
    pub dea: Vec<f64>,
    pub macd: Vec<f64>,
}

/// 小周期计数转 f64（指标周期远小于 u32 上限）
fn weight(n: usize) -> f64 {
    f64::from(u32::try_from(n).unwrap_or(u32::MAX))
}

fn require_period(period: usize, name: &str) -> Result<(), IndicatorError> {
    if period == 0 {
        return Err(IndicatorError::InvalidPeriod(format!(
            "{} period must be > 0",
            name
        )));
    }
    Ok(())
}

fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

/// # Summary
/// 简单移动平均：末尾 `period` 根收盘价的算术平均。
///
/// # Logic
/// 1. 滚动累加窗口和，避免逐点重复求和。
/// 2. 前 `period - 1` 个位置以 NaN 占位。
///
/// # Arguments
/// * `candles`: 源 K 线序列。
/// * `period`: 窗口长度。
///
/// # Returns
/// 与输入等长的均值序列。
pub fn ma(candles: &[Candle], period: usize) -> Result<Vec<f64>, IndicatorError> {
    require_period(period, "MA")?;
    let closes = closes(candles);
    let pf = weight(period);

    let mut out = vec![f64::NAN; closes.len()];
    let mut window_sum = 0.0;
    for (i, close) in closes.iter().enumerate() {
        window_sum += close;
        if i >= period {
            window_sum -= closes[i - period];
        }
        if i + 1 >= period {
            out[i] = window_sum / pf;
        }
    }
    Ok(out)
}

/// 数值序列上的 EMA（供收盘价与 DIF 复用）
fn ema_values(values: &[f64], period: usize) -> Vec<f64> {
    let k = 2.0 / (weight(period) + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev = match values.first() {
        Some(first) => *first,
        None => return out,
    };
    out.push(prev);
    for value in &values[1..] {
        prev = value * k + prev * (1.0 - k);
        out.push(prev);
    }
    out
}

/// # Summary
/// 指数移动平均：以首个收盘价为种子，`k = 2 / (period + 1)`。
///
/// # Logic
/// `ema[i] = close[i] * k + ema[i-1] * (1 - k)`，每个下标都有定义
/// （无暖机空档）。注意种子取首值而非 SMA，须逐位复现此约定。
///
/// # Arguments
/// * `candles`: 源 K 线序列。
/// * `period`: 平滑周期。
///
/// # Returns
/// 与输入等长的 EMA 序列。
pub fn ema(candles: &[Candle], period: usize) -> Result<Vec<f64>, IndicatorError> {
    require_period(period, "EMA")?;
    Ok(ema_values(&closes(candles), period))
}

/// # Summary
/// 布林带：中轨为 MA(period)，上下轨为中轨 ± multiplier × 总体标准差。
///
/// # Logic
/// 1. 中轨复用 `ma`。
/// 2. 标准差按总体口径（除以 period 而非 period - 1）。
/// 3. 前 `period - 1` 个位置三轨均为 NaN。
///
/// # Arguments
/// * `candles`: 源 K 线序列。
/// * `period`: 窗口长度。
/// * `multiplier`: 带宽倍数（常用 2.0）。
///
/// # Returns
/// 三轨等长序列。
pub fn boll(
    candles: &[Candle],
    period: usize,
    multiplier: f64,
) -> Result<BollBands, IndicatorError> {
    require_period(period, "BOLL")?;
    if !multiplier.is_finite() || multiplier <= 0.0 {
        return Err(IndicatorError::InvalidParam(format!(
            "BOLL multiplier must be positive, got {}",
            multiplier
        )));
    }

    let closes = closes(candles);
    let middle = ma(candles, period)?;
    let pf = weight(period);

    let mut upper = vec![f64::NAN; closes.len()];
    let mut lower = vec![f64::NAN; closes.len()];
    for i in 0..closes.len() {
        if i + 1 < period {
            continue;
        }
        let mean = middle[i];
        let window = &closes[i + 1 - period..=i];
        let variance = window.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / pf;
        let band = multiplier * variance.sqrt();
        upper[i] = mean + band;
        lower[i] = mean - band;
    }

    Ok(BollBands {
        upper,
        middle,
        lower,
    })
}

/// # Summary
/// Wilder 平滑 RSI。
///
/// # Logic
/// 1. 下标 0 恒为 NaN（无前收可差分）。
/// 2. 暖机期（前 `period` 个样本）对已有涨跌幅做算术平均。
/// 3. 自下标 `period` 起按 `(prevAvg * (period - 1) + current) / period`
///    指数平滑。
/// 4. `RS = avgGain / avgLoss`，`RSI = 100 - 100 / (1 + RS)`；
///    退化情形 `avgLoss == 0` 直接取 100。
///
/// # Arguments
/// * `candles`: 源 K 线序列。
/// * `period`: 平滑周期（常用 14）。
///
/// # Returns
/// 与输入等长的 RSI 序列，下标 >= 1 的值落在 [0, 100]。
pub fn rsi(candles: &[Candle], period: usize) -> Result<Vec<f64>, IndicatorError> {
    require_period(period, "RSI")?;
    let closes = closes(candles);
    let pf = weight(period);

    let mut out = vec![f64::NAN; closes.len()];
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    let mut cum_gain = 0.0;
    let mut cum_loss = 0.0;

    for i in 1..closes.len() {
        let delta = closes[i] - closes[i - 1];
        let gain = delta.max(0.0);
        let loss = (-delta).max(0.0);

        if i < period {
            cum_gain += gain;
            cum_loss += loss;
            let count = weight(i);
            avg_gain = cum_gain / count;
            avg_loss = cum_loss / count;
        } else {
            avg_gain = (avg_gain * (pf - 1.0) + gain) / pf;
            avg_loss = (avg_loss * (pf - 1.0) + loss) / pf;
        }

        out[i] = if avg_loss == 0.0 {
            100.0
        } else {
            let rs = avg_gain / avg_loss;
            100.0 - 100.0 / (1.0 + rs)
        };
    }
    Ok(out)
}

/// # Summary
/// MACD：`DIF = EMA(fast) - EMA(slow)`，`DEA = EMA(DIF, signal)`，
/// 柱状图为 `2 * (DIF - DEA)`。
///
/// # Logic
/// ×2 约定对齐常见看盘软件的显示口径，须精确保留。
///
/// # Arguments
/// * `candles`: 源 K 线序列。
/// * `fast` / `slow` / `signal`: 快慢线与信号线周期（常用 12/26/9）。
///
/// # Returns
/// 三序列等长结果；`fast >= slow` 视为契约错误。
pub fn macd(
    candles: &[Candle],
    fast: usize,
    slow: usize,
    signal: usize,
) -> Result<MacdSeries, IndicatorError> {
    require_period(fast, "MACD fast")?;
    require_period(slow, "MACD slow")?;
    require_period(signal, "MACD signal")?;
    if fast >= slow {
        return Err(IndicatorError::InvalidPeriod(format!(
            "MACD fast period {} must be shorter than slow period {}",
            fast, slow
        )));
    }

    let closes = closes(candles);
    let ema_fast = ema_values(&closes, fast);
    let ema_slow = ema_values(&closes, slow);

    let dif: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();
    let dea = ema_values(&dif, signal);
    let macd = dif
        .iter()
        .zip(&dea)
        .map(|(d, e)| 2.0 * (d - e))
        .collect();

    Ok(MacdSeries { dif, dea, macd })
}
