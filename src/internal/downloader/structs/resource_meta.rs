/// 远程资源元数据：每次下载探测一次，之后只读。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceMeta {
    /// 资源大小（字节），恒大于 0
    pub size: u64,
    /// 服务器是否支持 Range 请求（`Accept-Ranges` / `Accept-Range`）
    pub supports_ranges: bool,
    /// 从 `Content-Disposition` 解析出的文件名，没有则为空字符串
    pub suggested_name: String,
}
