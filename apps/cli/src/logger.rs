const COLOR_RESET: &str = "\x1b[0m";
const COLOR_RED: &str = "\x1b[31m";
const COLOR_YELLOW: &str = "\x1b[33m";
const COLOR_GREEN: &str = "\x1b[32m";

/**
 * \brief 信息级控制台输出。
 */
pub fn info(message: &str) {
    println!("{}[INF] {}{}", COLOR_GREEN, message, COLOR_RESET);
}

/**
 * \brief 警告级控制台输出。
 */
pub fn warn(message: &str) {
    println!("{}[WRN] {}{}", COLOR_YELLOW, message, COLOR_RESET);
}

/**
 * \brief 错误级控制台输出。
 */
pub fn error(message: &str) {
    println!("{}[ERR] {}{}", COLOR_RED, message, COLOR_RESET);
}
