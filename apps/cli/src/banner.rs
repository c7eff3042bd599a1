const BANNER: &str = r#"
   ____          _      ____  _            _   _
  / ___|___   __| | ___/ ___|| | ___ _   _| |_| |__
 | |   / _ \ / _` |/ _ \___ \| |/ _ \ | | | __| '_ \
 | |__| (_) | (_| |  __/___) | |  __/ |_| | |_| | | |
  \____\___/ \__,_|\___|____/|_|\___|\__,_|\__|_| |_|
"#;

/**
 * \brief 启动时打印的 ASCII 横幅。
 */
pub fn print() {
    println!("{}", BANNER);
    println!("  LLM-assisted source code vulnerability scanner\n");
}
